use std::time::Duration;
use wall_aggregator::utils::text::{folded_plain_text, plain_text};
use wall_aggregator::utils::time::format_duration;

#[test]
fn test_plain_text_strips_tags_and_collapses_whitespace() {
    let html = "<p>Hello <strong>wall</strong>!</p><p>Second\n   paragraph</p>";
    assert_eq!(plain_text(html), "Hello wall! Second paragraph");
}

#[test]
fn test_plain_text_keeps_words_apart_across_breaks() {
    assert_eq!(plain_text("one<br>two<br/>three"), "one two three");
}

#[test]
fn test_plain_text_decodes_common_entities() {
    assert_eq!(
        plain_text("<p>Tom &amp; Jerry &lt;3 &quot;cheese&quot; &#39;n&apos; crackers</p>"),
        "Tom & Jerry <3 \"cheese\" 'n' crackers"
    );
    // Decoding happens once.
    assert_eq!(plain_text("&amp;lt;"), "&lt;");
}

#[test]
fn test_plain_text_keeps_words_split_by_inline_tags_whole() {
    assert_eq!(plain_text("<p>sp<b>am</b></p>"), "spam");
    assert_eq!(plain_text("<p>Buy sp<em>a</em>m <a href=\"https://x.example\">now</a></p>"), "Buy spam now");
}

#[test]
fn test_plain_text_decodes_named_and_numeric_entities() {
    assert_eq!(plain_text("caf&eacute;"), "café");
    assert_eq!(plain_text("wait&#8230;"), "wait…");
    assert_eq!(plain_text("wait&#8230;").chars().count(), 5);
    assert_eq!(plain_text("&#x2014;&nbsp;ok"), "— ok");
}

#[test]
fn test_plain_text_of_empty_or_tag_only_input() {
    assert_eq!(plain_text(""), "");
    assert_eq!(plain_text("<p></p><br/>"), "");
}

#[test]
fn test_folded_plain_text_lowercases() {
    assert_eq!(folded_plain_text("<b>RUST</b>Conf"), "rustconf");
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_secs(30)), "30s");
    assert_eq!(format_duration(Duration::from_secs(300)), "5m");
    assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
    assert_eq!(format_duration(Duration::from_secs(172800)), "2d");
}
