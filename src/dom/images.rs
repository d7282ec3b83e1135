use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::css::CssClassDictionary;
use crate::dom::node::{ImageRecord, ImageSource};
use crate::utils::resolve_url;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("IMG_SELECTOR: hardcoded selector is valid"));

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("CSS_URL_RE: hardcoded regex is valid")
});

/// Image record for an `<img>` element: `src`, then `data-src`, then the
/// first `srcset` candidate
pub fn image_from_element(element: ElementRef, base: &Url) -> Option<ImageRecord> {
    let el = element.value();

    let direct = el
        .attr("src")
        .or_else(|| el.attr("data-src"))
        .and_then(|src| resolve_url(base, src));

    let (src, source) = match direct {
        Some(src) => (src, ImageSource::Img),
        None => {
            let srcset = el.attr("srcset").or_else(|| el.attr("data-srcset"))?;
            let first = srcset.split(',').next()?.split_whitespace().next()?;
            (resolve_url(base, first)?, ImageSource::Srcset)
        }
    };

    let mut image = ImageRecord::new(src, source).with_alt(el.attr("alt").unwrap_or_default());
    image.width = el.attr("width").map(str::to_string);
    image.height = el.attr("height").map(str::to_string);
    Some(image)
}

/// Every `<img>` in a document, deduplicated by resolved URL
pub fn collect_images(document: &Html, base: &Url) -> Vec<ImageRecord> {
    let mut seen = HashSet::new();
    document
        .select(&IMG_SELECTOR)
        .filter_map(|img| image_from_element(img, base))
        .filter(|image| seen.insert(image.src.clone()))
        .collect()
}

/// `url(...)` references in `background`/`background-image` declarations
pub fn background_image_urls(value: &str) -> impl Iterator<Item = &str> {
    CSS_URL_RE
        .captures_iter(value)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Background images declared in class rules, as image records
pub fn background_images(css: &CssClassDictionary, base: &Url) -> Vec<ImageRecord> {
    let mut images = Vec::new();
    for rule in css.rules() {
        for (property, value) in &rule.properties {
            if property != "background" && property != "background-image" {
                continue;
            }
            for reference in background_image_urls(value) {
                if let Some(src) = resolve_url(base, reference) {
                    images.push(ImageRecord::new(src, ImageSource::Background));
                }
            }
        }
    }
    images
}

/// Append `extra` to `images`, skipping URLs already present
pub fn merge_images(images: &mut Vec<ImageRecord>, extra: Vec<ImageRecord>) {
    let mut seen: HashSet<String> = images.iter().map(|i| i.src.clone()).collect();
    for image in extra {
        if seen.insert(image.src.clone()) {
            images.push(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/shop/").unwrap()
    }

    #[test]
    fn test_collect_images() {
        let html = r#"<body>
            <img src="hero.jpg" alt="Hero" width="1200">
            <img srcset="small.jpg 480w, large.jpg 1080w">
            <img src="hero.jpg">
            <img>
        </body>"#;
        let images = collect_images(&Html::parse_document(html), &base());

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].src, "https://example.com/shop/hero.jpg");
        assert_eq!(images[0].width.as_deref(), Some("1200"));
        assert_eq!(images[1].src, "https://example.com/shop/small.jpg");
        assert_eq!(images[1].source, ImageSource::Srcset);
    }

    #[test]
    fn test_background_images_from_dictionary() {
        let css = CssClassDictionary::parse(
            ".hero { background: url('/img/bg.png') no-repeat } .x { background-image: url(//cdn.example.com/y.webp) } .z { background-image: url(data:image/png;base64,AA) }",
        );
        let images = background_images(&css, &base());

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].src, "https://example.com/img/bg.png");
        assert_eq!(images[1].src, "https://cdn.example.com/y.webp");
        assert_eq!(images[0].source, ImageSource::Background);
    }

    #[test]
    fn test_merge_images_dedupes() {
        let mut images = vec![ImageRecord::new("https://example.com/a.png", ImageSource::Img)];
        merge_images(
            &mut images,
            vec![
                ImageRecord::new("https://example.com/a.png", ImageSource::Background),
                ImageRecord::new("https://example.com/b.png", ImageSource::Background),
            ],
        );
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].source, ImageSource::Img);
    }
}
