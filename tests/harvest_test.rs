use pagealt::filter::filter;
use pagealt::{harvest, SourceKind};
use pretty_assertions::assert_eq;

#[test]
fn harvest_and_filter_rank_hero_above_logo() {
    let html = r#"<img src="logo.svg" width="20" height="20"><img src="hero.jpg" width="800" height="400">"#;
    let harvested = harvest(html, "https://x.test");
    assert_eq!(harvested.len(), 2);

    let filtered = filter(harvested, 3);
    // logo area 400 passes the >100 rule, so both are kept, but the hero's
    // area of 320000 ranks it first.
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered[0].url, "https://x.test/hero.jpg");
    assert_eq!(filtered[1].url, "https://x.test/logo.svg");
}

#[test]
fn all_four_passes_contribute_to_one_merged_list() {
    let html = r#"
        <img src="/inline.jpg" width="600" height="300">
        <picture>
            <source srcset="/variant-small.webp 480w, /variant-large.webp 1600w">
            <img src="/picture-fallback.jpg" alt="gallery shot">
        </picture>
        <div style="background-image: url('/css-bg.png')"></div>
        <section data-bg="/lazy-bg.jpg"></section>
    "#;
    let harvested = harvest(html, "https://x.test/page");

    let kinds: Vec<SourceKind> = harvested.iter().map(|c| c.source).collect();
    assert!(kinds.contains(&SourceKind::Img));
    assert!(kinds.contains(&SourceKind::Picture));
    assert!(kinds.contains(&SourceKind::CssBackground));
    assert!(kinds.contains(&SourceKind::DataBg));

    let picture = harvested
        .iter()
        .find(|c| c.source == SourceKind::Picture)
        .unwrap();
    assert_eq!(picture.url, "https://x.test/variant-large.webp");
    assert_eq!(picture.alt.as_deref(), Some("gallery shot"));
}

#[test]
fn harvested_urls_are_unique() {
    let html = r#"
        <img src="/repeat.jpg">
        <img src="/repeat.jpg">
        <div data-bg="/repeat.jpg"></div>
    "#;
    let harvested = harvest(html, "https://x.test/");
    assert_eq!(harvested.len(), 1);
}

#[test]
fn malformed_markup_never_panics() {
    let cases = [
        "<img src=",
        "<img src=\"unterminated",
        "<picture><img></picture>",
        "<div style=\"background: url(\">",
        "<img srcset=\",,,\" src=\"ok.jpg\">",
    ];
    for html in cases {
        let _ = harvest(html, "https://x.test/");
    }
}
