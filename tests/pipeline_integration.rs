use sitelens::analysis::roles::Role;
use sitelens::budget::apply_budget;
use sitelens::{AnalysisRequest, Analyzer, AnalyzerOptions, LensError, TierName, TokenBudgetOverrides};

const LANDING: &str = r##"<!DOCTYPE html>
<html lang="en-GB">
<head>
  <title>Northwind Coffee</title>
  <meta name="description" content="Small batch roasters">
  <meta property="og:image" content="/og.png">
  <link rel="icon" href="/favicon.ico">
  <link rel="stylesheet" href="https://fonts.googleapis.com/css2?family=Inter:wght@400;700&display=swap">
  <style>
    /* layout */
    body { background-color: #ffffff; color: #222222 }
    .hero { background-color: #1b1b1b; padding: 80px 24px; display: flex; position: relative }
    .card { padding: 24px; background-color: #f5f5f5 }
    .grid { display: grid; gap: 24px }
    @media (max-width: 600px) { .grid { display: block } }
  </style>
</head>
<body>
  <header>
    <nav>
      <ul>
        <li><a href="/">Home</a></li>
        <li><a href="/shop">Shop</a><ul><li><a href="/shop/beans">Beans</a></li></ul></li>
        <li><a href="/visit">Visit</a></li>
      </ul>
    </nav>
  </header>
  <section class="hero">
    <h1>Coffee worth waking up for</h1>
    <a class="btn btn-primary" href="/shop" onclick="track()">Shop beans</a>
  </section>
  <div class="grid">
    <div class="card"><img src="/img/ethiopia.jpg" alt="Ethiopia"><p>Floral and bright</p></div>
    <div class="card" style="padding: 8px"><img src="/img/colombia.jpg"><p>Chocolate and caramel</p></div>
    <div class="card"><p>House blend</p></div>
  </div>
  <form action="/subscribe" method="post">
    <label for="email">Email</label>
    <input id="email" type="email" name="email" required>
    <input type="hidden" name="source" value="landing">
    <button type="submit">Join</button>
  </form>
  <footer>
    <div>
      <div><a href="/about">About</a></div>
      <div><a href="https://instagram.com/northwind">Instagram</a></div>
    </div>
  </footer>
  <script>window.track = function () {}</script>
</body>
</html>"##;

fn analyze(html: &str, tier: Option<TierName>) -> sitelens::Result<sitelens::AnalysisReport> {
    let mut request = AnalysisRequest::new(html, "https://northwind.test/");
    request.tier = tier;
    Analyzer::default().analyze_offline(&request)
}

fn long_page(sections: usize) -> String {
    let mut html = String::from(
        "<html><head><style>.row { display: flex; padding: 32px; color: #333333 } .muted { color: #777777 }</style></head><body>",
    );
    for i in 0..sections {
        html.push_str(&format!(
            "<section class=\"row\"><h2>Chapter {}</h2><p class=\"muted\">{}</p></section>",
            i,
            "the quick brown fox jumps over the lazy dog ".repeat(8)
        ));
    }
    html.push_str("</body></html>");
    html
}

#[test]
fn test_full_page_ir() {
    let report = analyze(LANDING, None).unwrap();
    let ir = &report.ir;

    let roots: Vec<&str> = ir.tree.iter().map(|n| n.tag.as_str()).collect();
    assert_eq!(roots, vec!["header", "section", "div", "form", "footer"]);
    assert!(ir.nodes().all(|n| n.tag != "script" && n.tag != "style"));
    assert!(ir.nodes().all(|n| !n.attributes.contains_key("onclick")));
    assert_eq!(ir.total_nodes, ir.nodes().count());

    assert_eq!(ir.metadata.title.as_deref(), Some("Northwind Coffee"));
    assert_eq!(ir.metadata.og_image.as_deref(), Some("https://northwind.test/og.png"));
    assert_eq!(ir.language.as_deref(), Some("en"));

    assert_eq!(ir.navigation.items.len(), 3);
    assert!(ir.navigation.nested);
    assert_eq!(ir.navigation.items[1].href.as_deref(), Some("https://northwind.test/shop"));

    assert_eq!(ir.forms.len(), 1);
    assert_eq!(ir.forms[0].method, "POST");
    assert_eq!(ir.forms[0].fields.len(), 1);
    assert_eq!(ir.forms[0].fields[0].label.as_deref(), Some("Email"));
    assert!(ir.forms[0].fields[0].required);

    assert!(ir.fonts.iter().any(|f| f.family == "Inter"));
    assert!(ir.social_links.iter().any(|s| s.platform == "instagram"));
    assert_eq!(ir.ctas.iter().filter(|c| c.text == "Shop beans").count(), 1);

    assert_eq!(ir.colors[0].value, "#ffffff");
    assert!(ir.css_info.uses_grid);
    assert_eq!(ir.css_info.media_queries, vec!["(max-width: 600px)".to_string()]);
}

#[test]
fn test_document_order_is_pre_order() {
    let report = analyze(LANDING, None).unwrap();
    let orders: Vec<u32> = report.ir.nodes().map(|n| n.document_order).collect();

    assert_eq!(orders[0], 0);
    assert!(orders.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(orders, (0..orders.len() as u32).collect::<Vec<_>>());
}

#[test]
fn test_resolved_css_precedence() {
    let report = analyze(LANDING, None).unwrap();
    let cards: Vec<_> = report.ir.nodes().filter(|n| n.has_class("card")).collect();

    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].css("padding"), Some("24px"));
    assert_eq!(cards[1].css("padding"), Some("8px"));
    assert_eq!(cards[1].css("background-color"), Some("#f5f5f5"));
    assert_eq!(cards[0].direct_images.len(), 1);
    assert_eq!(cards[0].direct_images[0].src, "https://northwind.test/img/ethiopia.jpg");
}

#[test]
fn test_structural_analysis() {
    let report = analyze(LANDING, None).unwrap();
    let structural = report.structural();
    let hero = report.ir.nodes().find(|n| n.has_class("hero")).unwrap();

    assert!(structural
        .section_candidates
        .iter()
        .any(|c| c.document_order == hero.document_order));
    assert_eq!(structural.section_count, structural.section_candidates.len());
    assert!(structural.reasons.len() <= 3);

    let roles = structural.roles.as_ref().unwrap();
    let footer = report.ir.tree.iter().find(|n| n.tag == "footer").unwrap();
    let footer_role = roles.iter().find(|r| r.document_order == footer.document_order).unwrap();
    assert_eq!(footer_role.role, Role::Footer);
}

#[test]
fn test_role_inference_can_be_disabled() {
    let analyzer = Analyzer::new(AnalyzerOptions::new().role_inference(false));
    let report = analyzer
        .analyze_offline(&AnalysisRequest::new(LANDING, "https://northwind.test/"))
        .unwrap();
    assert!(report.structural().roles.is_none());
}

#[test]
fn test_free_tier_reduction() {
    let report = analyze(&long_page(50), Some(TierName::Free)).unwrap();
    let ir = &report.ir;

    assert_eq!(ir.tree.len(), 30);
    assert!(ir.nodes().all(|n| n.direct_text.chars().count() <= 120));

    let dictionary = ir.css_value_dictionary.as_ref().unwrap();
    let display = dictionary.id_for("display", "flex").unwrap();
    assert!(display.starts_with("$d"));
    assert!(ir.tree.iter().all(|n| n.css("display") == Some(display)));

    let reduction = report.reduction.unwrap();
    assert_eq!(reduction.nodes_after, ir.total_nodes);
    assert!(reduction.nodes_before > reduction.nodes_after);
    assert!(reduction.estimated_tokens <= 8_000);
}

#[test]
fn test_reduction_is_idempotent() {
    let report = analyze(&long_page(50), Some(TierName::Basic)).unwrap();
    let mut again = report.ir.clone();
    apply_budget(&mut again, &TierName::Basic.config()).unwrap();

    assert_eq!(again.tree, report.ir.tree);
    assert_eq!(again.total_nodes, report.ir.total_nodes);
    assert_eq!(
        again.css_value_dictionary.as_ref().map(|d| d.iter().count()),
        report.ir.css_value_dictionary.as_ref().map(|d| d.iter().count())
    );
}

#[test]
fn test_custom_budget_layers_over_free() {
    let mut request = AnalysisRequest::new(long_page(20), "https://northwind.test/").with_custom_budget(
        TokenBudgetOverrides {
            max_nodes: Some(5),
            ..Default::default()
        },
    );
    request.tier = Some(TierName::Enterprise);

    let report = Analyzer::default().analyze_offline(&request).unwrap();
    assert_eq!(report.ir.tree.len(), 5);
    // free's text limit still applies
    assert!(report.ir.nodes().all(|n| n.direct_text.chars().count() <= 120));
}

#[test]
fn test_script_rendered_page_is_unprocessable() {
    let err = analyze(
        r#"<html><head><script src="/app.js"></script></head><body><div id="root"></div></body></html>"#,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LensError::UnprocessableContent(_)));
}

#[test]
fn test_oversized_html_is_rejected() {
    let analyzer = Analyzer::new(AnalyzerOptions::new().max_html_bytes(1_000));
    let err = analyzer
        .analyze_offline(&AnalysisRequest::new(long_page(10), "https://northwind.test/"))
        .unwrap_err();
    assert!(matches!(err, LensError::PayloadTooLarge(_)));
}

#[test]
fn test_tiny_token_budget_fails() {
    let request = AnalysisRequest::new(LANDING, "https://northwind.test/").with_custom_budget(TokenBudgetOverrides {
        max_tokens: Some(50),
        ..Default::default()
    });
    let err = Analyzer::default().analyze_offline(&request).unwrap_err();
    assert_eq!(err.kind(), sitelens::ErrorKind::PayloadTooLarge);
}

#[test]
fn test_data_uri_backgrounds_survive_parsing() {
    let html = r#"<html><head><style>
        .hero { background: url(data:image/svg+xml;base64,PHN2Zz4=) #102030; padding: 40px }
    </style></head><body>
      <section class="hero"><h1>Roasted this week</h1><p>Small batches from three farms, shipped the day after roasting.</p></section>
      <div class="badge" style="background-image: url('data:image/png;base64,AA'); color: #445566">Fresh</div>
    </body></html>"#;
    let report = analyze(html, None).unwrap();
    let ir = &report.ir;

    let hero = ir.nodes().find(|n| n.has_class("hero")).unwrap();
    assert_eq!(hero.css("background"), Some("url(data:image/svg+xml;base64,PHN2Zz4=) #102030"));
    assert_eq!(hero.css("padding"), Some("40px"));

    let badge = ir.nodes().find(|n| n.has_class("badge")).unwrap();
    assert_eq!(badge.css("background-image"), Some("url('data:image/png;base64,AA')"));
    assert_eq!(badge.css("color"), Some("#445566"));

    assert!(ir.colors.iter().any(|c| c.value == "#102030"));
    assert!(ir.colors.iter().any(|c| c.value == "#445566"));
    assert!(report
        .structural()
        .section_candidates
        .iter()
        .any(|c| c.document_order == hero.document_order));
}

fn list_page(sections: usize, items: usize) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..sections {
        html.push_str("<section><ul>");
        for j in 0..items {
            html.push_str(&format!("<li><p>Item {} of {}</p></li>", j, i));
        }
        html.push_str("</ul></section>");
    }
    html.push_str("</body></html>");
    html
}

#[test]
fn test_free_tier_fits_with_and_without_roles() {
    let html = list_page(30, 4);
    let request = AnalysisRequest::new(html.as_str(), "https://northwind.test/").with_tier(TierName::Free);

    let with_roles = Analyzer::default().analyze_offline(&request).unwrap();
    let without_roles = Analyzer::new(AnalyzerOptions::new().role_inference(false))
        .analyze_offline(&request)
        .unwrap();

    assert!(with_roles.reduction.unwrap().estimated_tokens <= 8_000);
    assert!(without_roles.reduction.unwrap().estimated_tokens <= 8_000);
    assert_eq!(with_roles.ir.tree, without_roles.ir.tree);

    let kept: Vec<u32> = with_roles.ir.nodes().map(|n| n.document_order).collect();
    if let Some(roles) = &with_roles.structural().roles {
        assert!(roles.iter().all(|r| kept.contains(&r.document_order)));
    } else {
        assert!(with_roles.reduction.unwrap().roles_dropped);
    }
}

#[test]
fn test_roles_give_way_to_the_token_ceiling() {
    let html = list_page(30, 4);
    let uncapped = TokenBudgetOverrides {
        max_tokens: Some(-1),
        ..Default::default()
    };
    let request = AnalysisRequest::new(html.as_str(), "https://northwind.test/").with_custom_budget(uncapped);
    let bare = Analyzer::new(AnalyzerOptions::new().role_inference(false))
        .analyze_offline(&request)
        .unwrap()
        .reduction
        .unwrap();
    let full = Analyzer::default().analyze_offline(&request).unwrap().reduction.unwrap();
    assert!(full.estimated_tokens > bare.estimated_tokens);

    let tight = AnalysisRequest::new(html.as_str(), "https://northwind.test/").with_custom_budget(TokenBudgetOverrides {
        max_tokens: Some(bare.estimated_tokens as i64),
        ..Default::default()
    });
    let report = Analyzer::default().analyze_offline(&tight).unwrap();
    let reduction = report.reduction.unwrap();

    assert!(reduction.roles_dropped);
    assert!(report.structural().roles.is_none());
    assert_eq!(reduction.estimated_tokens, bare.estimated_tokens);
}

#[test]
fn test_free_tier_ceiling_rejects_dense_pages() {
    let mut html = String::from("<html><body>");
    for i in 0..30 {
        html.push_str(&format!("<article><h2>Entry {}</h2>", i));
        for _ in 0..20 {
            html.push_str(&format!("<p>{}</p>", "grounds and crema and steam ".repeat(4)));
        }
        html.push_str("</article>");
    }
    html.push_str("</body></html>");

    let err = analyze(&html, Some(TierName::Free)).unwrap_err();
    assert!(matches!(err, LensError::PayloadTooLarge(_)));
    assert!(analyze(&html, Some(TierName::Enterprise)).is_ok());
}
