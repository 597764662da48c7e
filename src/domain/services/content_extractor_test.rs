use super::*;

const PAGE_URL: &str = "https://uni.example.edu/funding";

#[test]
fn test_class_container_produces_block() {
    let html = r#"
        <html><body>
          <div class="scholarship-card">
            <h3>STEM Excellence Award</h3>
            <p>Award amount: $5,000 per year.</p>
            <p>Deadline: 03/15/2025</p>
            <a href="/apply/stem">Apply now</a>
          </div>
        </body></html>
    "#;

    let page = ContentExtractor::new().parse(html, PAGE_URL);

    assert!(page.error.is_none());
    assert_eq!(page.domain, "uni.example.edu");
    assert_eq!(page.text_blocks.len(), 1);
    let block = &page.text_blocks[0];
    assert!(block.starts_with("Title: STEM Excellence Award\n"));
    assert!(block.contains("\nAmount: $5,000\n"));
    assert!(block.contains("\nDeadline: Deadline: 03/15/2025\n"));
    assert!(block.contains("\nURL: https://uni.example.edu/apply/stem\n"));
    assert!(block.contains(
        "\nDescription: STEM Excellence Award Award amount: $5,000 per year. Deadline: 03/15/2025 Apply now"
    ));
}

#[test]
fn test_container_without_heading_is_skipped() {
    let html = r#"<div class="award-box"><p>Up to $500</p></div>"#;
    let page = ContentExtractor::new().parse(html, PAGE_URL);
    assert!(page.text_blocks.is_empty());
    assert!(page.error.is_none());
}

#[test]
fn test_heading_fallback_groups_following_siblings() {
    let html = r#"
        <html><body>
          <h2>Merit Scholarship</h2>
          <p>Overview text.</p>
          <h3>Eligibility</h3>
          <p>Worth $2,500 for seniors.</p>
          <p>Apply by March 1, 2026</p>
          <h2>Campus News</h2>
          <p>Tickets cost $10</p>
        </body></html>
    "#;

    let page = ContentExtractor::new().parse(html, PAGE_URL);

    assert_eq!(page.text_blocks.len(), 1);
    let block = &page.text_blocks[0];
    assert_eq!(
        block,
        &format_block(
            "Merit Scholarship",
            "$2,500",
            "March 1, 2026",
            PAGE_URL,
            "Overview text. Eligibility Worth $2,500 for seniors. Apply by March 1, 2026",
        )
    );
}

#[test]
fn test_heading_section_ends_at_higher_rank_heading() {
    let html = r#"
        <html><body>
          <h3>Travel Grant</h3>
          <p>Covers conference fees.</p>
          <h4>Details</h4>
          <p>Up to $800.</p>
          <h2>Other News</h2>
          <p>Library closes at $9 fee</p>
        </body></html>
    "#;

    let page = ContentExtractor::new().parse(html, PAGE_URL);

    assert_eq!(page.text_blocks.len(), 1);
    let block = &page.text_blocks[0];
    assert!(block.contains("\nAmount: $800\n"));
    assert!(block.ends_with("Description: Covers conference fees. Details Up to $800."));
}

#[test]
fn test_nested_containers_yield_innermost_blocks() {
    let html = r#"
        <div class="scholarships-list">
          <h2>Our Scholarships</h2>
          <div class="scholarship-item"><h3>STEM Award</h3><p>$1,000 each year.</p></div>
          <div class="scholarship-item"><h3>Arts Award</h3><p>$750 once.</p></div>
        </div>
        <section class="grant-info">
          <h3>Research Grant</h3>
          <div class="grant-amount">$2,000</div>
        </section>
    "#;

    let page = ContentExtractor::new().parse(html, PAGE_URL);

    let titles: Vec<&str> = page
        .text_blocks
        .iter()
        .filter_map(|b| b.lines().next())
        .collect();
    assert_eq!(
        titles,
        vec!["Title: STEM Award", "Title: Arts Award", "Title: Research Grant"]
    );
    assert!(page.text_blocks[2].contains("\nAmount: $2,000\n"));
}

#[test]
fn test_missing_fields_default_to_not_specified() {
    let html = r#"<section class="funding-opportunities"><h4>Travel Grant</h4><p>Ask the office.</p></section>"#;
    let page = ContentExtractor::new().parse(html, PAGE_URL);

    assert_eq!(page.text_blocks.len(), 1);
    let block = &page.text_blocks[0];
    assert!(block.contains("\nAmount: Not specified\n"));
    assert!(block.contains("\nDeadline: Not specified\n"));
    assert!(block.contains(&format!("\nURL: {}\n", PAGE_URL)));
}

#[test]
fn test_full_text_strips_chrome() {
    let html = r#"
        <html>
          <head><style>.x { color: red; }</style></head>
          <body>
            <header>Site header</header>
            <nav>Menu</nav>
            <p>Hello</p>
            <script>var a = 1;</script>
            <p>   World   </p>
            <footer>Footer text</footer>
          </body>
        </html>
    "#;

    let page = ContentExtractor::new().parse(html, PAGE_URL);
    assert_eq!(page.full_text, "Hello\nWorld");
}

#[test]
fn test_invalid_page_url_reports_error() {
    let page = ContentExtractor::new().parse("<p>hi</p>", "not a url");
    assert!(page.error.is_some());
    assert!(page.text_blocks.is_empty());
    assert!(page.full_text.is_empty());
}

#[test]
fn test_empty_document() {
    let page = ContentExtractor::new().parse("", PAGE_URL);
    assert!(page.error.is_none());
    assert!(page.text_blocks.is_empty());
    assert!(page.full_text.is_empty());
}
