// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scholarrs::domain::models::scholarship::AmountType;
use scholarrs::domain::services::content_extractor::{ContentExtractor, NOT_SPECIFIED};
use scholarrs::domain::services::scholarship_extractor::normalize_amount;

const PAGE: &str = r#"<html><body>
<nav>Home | About</nav>
<article class="award-card">
  <h2>Women in STEM Award</h2>
  <p>Awards range from $1,000 - $3,000, renewable each year.</p>
  <a href="details/stem">Learn more</a>
</article>
<article class="award-card">
  <h2>Arts Bursary</h2>
  <p>Support for studio costs.</p>
</article>
</body></html>"#;

#[test]
fn test_blocks_follow_document_order() {
    let parsed = ContentExtractor::new().parse(PAGE, "https://uni.edu/awards/");

    assert!(parsed.error.is_none());
    assert_eq!(parsed.domain, "uni.edu");
    assert_eq!(parsed.text_blocks.len(), 2);
    assert!(parsed.text_blocks[0].starts_with("Title: Women in STEM Award\n"));
    assert!(parsed.text_blocks[0].contains("\nURL: https://uni.edu/awards/details/stem\n"));
    assert!(parsed.text_blocks[1].starts_with("Title: Arts Bursary\n"));
    assert!(parsed.text_blocks[1].contains(&format!("\nAmount: {}\n", NOT_SPECIFIED)));
    assert!(parsed.text_blocks[1].contains("\nURL: https://uni.edu/awards/\n"));
    assert!(!parsed.full_text.contains("Home | About"));
}

#[test]
fn test_range_amount_normalization() {
    let amount = normalize_amount("$1,000 - $3,000, renewable each year");

    assert_eq!(amount.amount_type, AmountType::Range);
    assert_eq!(amount.min, Some(1000.0));
    assert_eq!(amount.max, Some(3000.0));
    assert!(amount.is_renewable);
}
