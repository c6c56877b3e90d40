// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders the HTML report document.

use super::{BADGE_LABEL, ReportRow};
use crate::{aggregate::AggregateTotals, config::ReportConfig, errors::RenderError};
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use std::io;
use swrite::{SWrite, swrite};

static HTML_TAG: &str = "html";
static HEAD_TAG: &str = "head";
static BODY_TAG: &str = "body";
static TABLE_TAG: &str = "table";
static THEAD_TAG: &str = "thead";
static TBODY_TAG: &str = "tbody";
static TR_TAG: &str = "tr";
static TD_TAG: &str = "td";
static DETAILS_TAG: &str = "details";

/// Renders the report document for `rows`, which are displayed in the order given.
pub fn render_document(
    totals: &AggregateTotals,
    rows: &[ReportRow<'_>],
    config: &ReportConfig,
) -> Result<String, RenderError> {
    // Serialize definitions first so a failure can name the offending test.
    let definitions = rows
        .iter()
        .map(|row| {
            serde_json::to_string_pretty(row.definition).map_err(|error| {
                RenderError::Definition {
                    name: row.definition.name().to_owned(),
                    error,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut buf = Vec::new();
    serialize_document(totals, rows, &definitions, config, &mut buf)
        .map_err(RenderError::Document)?;

    // Every byte written came from a &str, so this never substitutes anything.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn serialize_document(
    totals: &AggregateTotals,
    rows: &[ReportRow<'_>],
    definitions: &[String],
    config: &ReportConfig,
    writer: impl io::Write,
) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;

    let mut html_tag = BytesStart::new(HTML_TAG);
    html_tag.push_attribute(("lang", "en"));
    writer.write_event(Event::Start(html_tag))?;

    serialize_head(config, &mut writer)?;
    serialize_body(totals, rows, definitions, &mut writer)?;

    serialize_end_tag(HTML_TAG, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()
}

fn serialize_head(
    config: &ReportConfig,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    serialize_empty_start_tag(HEAD_TAG, writer)?;

    let mut meta_tag = BytesStart::new("meta");
    meta_tag.push_attribute(("charset", "utf-8"));
    writer.write_event(Event::Empty(meta_tag))?;

    serialize_text_element("title", &[], BADGE_LABEL, writer)?;

    let mut link_tag = BytesStart::new("link");
    link_tag.extend_attributes([("rel", "stylesheet"), ("href", config.stylesheet())]);
    writer.write_event(Event::Empty(link_tag))?;

    let mut script_tag = BytesStart::new("script");
    script_tag.push_attribute(("src", config.script()));
    writer.write_event(Event::Start(script_tag))?;
    serialize_end_tag("script", writer)?;

    serialize_end_tag(HEAD_TAG, writer)
}

fn serialize_body(
    totals: &AggregateTotals,
    rows: &[ReportRow<'_>],
    definitions: &[String],
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let passed = totals.passed().to_string();
    let total = totals.total().to_string();
    let rate = totals.display_rate();

    let mut summary = String::new();
    swrite!(summary, "{passed}/{total} ({rate}%) tests passed");

    serialize_empty_start_tag(BODY_TAG, writer)?;
    serialize_text_element("h1", &[], BADGE_LABEL, writer)?;
    serialize_text_element("p", &[("class", "summary")], &summary, writer)?;
    serialize_text_element(
        "progress",
        &[("value", passed.as_str()), ("max", total.as_str())],
        &format!("{rate}%"),
        writer,
    )?;

    let mut table_tag = BytesStart::new(TABLE_TAG);
    table_tag.push_attribute(("class", "results"));
    writer.write_event(Event::Start(table_tag))?;

    serialize_empty_start_tag(THEAD_TAG, writer)?;
    serialize_empty_start_tag(TR_TAG, writer)?;
    serialize_text_element("th", &[], "Test", writer)?;
    serialize_text_element("th", &[], "Status", writer)?;
    serialize_end_tag(TR_TAG, writer)?;
    serialize_end_tag(THEAD_TAG, writer)?;

    serialize_empty_start_tag(TBODY_TAG, writer)?;
    for (row, definition) in rows.iter().zip(definitions) {
        serialize_row(row, definition, writer)?;
    }
    serialize_end_tag(TBODY_TAG, writer)?;

    serialize_end_tag(TABLE_TAG, writer)?;
    serialize_end_tag(BODY_TAG, writer)
}

fn serialize_row(
    row: &ReportRow<'_>,
    definition: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let outcome = row.result.outcome;

    let mut tr_tag = BytesStart::new(TR_TAG);
    tr_tag.push_attribute(("class", format!("result {outcome}").as_str()));
    writer.write_event(Event::Start(tr_tag))?;

    let mut name_tag = BytesStart::new(TD_TAG);
    name_tag.push_attribute(("class", "name"));
    writer.write_event(Event::Start(name_tag))?;
    serialize_empty_start_tag(DETAILS_TAG, writer)?;
    serialize_text_element("summary", &[], &row.result.test_name, writer)?;
    serialize_text_element("pre", &[("class", "definition")], definition, writer)?;
    serialize_end_tag(DETAILS_TAG, writer)?;
    serialize_end_tag(TD_TAG, writer)?;

    serialize_text_element(
        TD_TAG,
        &[("class", "status")],
        &format!("{} {}", outcome.glyph(), outcome.label()),
        writer,
    )?;

    serialize_end_tag(TR_TAG, writer)
}

fn serialize_text_element(
    tag_name: &str,
    attributes: &[(&str, &str)],
    text: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut tag = BytesStart::new(tag_name);
    tag.extend_attributes(attributes.iter().copied());
    writer.write_event(Event::Start(tag))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    serialize_end_tag(tag_name, writer)
}

fn serialize_empty_start_tag(
    tag_name: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))
}

fn serialize_end_tag(tag_name: &str, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extract::ExtractedRecords,
        manifest::{self, ManifestIndex, TestCaseDefinition},
        report::join,
    };
    use indoc::indoc;

    fn render(input: &str, manifest_json: &str) -> String {
        let records = ExtractedRecords::from_input(input).expect("valid input");
        let totals =
            AggregateTotals::from_summaries(&records.summaries).expect("total is non-zero");
        let entries = manifest::filter_manifest(
            manifest::parse_entries(manifest_json).expect("valid manifest"),
        );
        let index = ManifestIndex::new(
            TestCaseDefinition::from_entries(entries).expect("names are present"),
        );
        let rows = join(&records.results, &index).expect("all tests are known");
        render_document(&totals, &rows, &ReportConfig::default_config())
            .expect("document renders")
    }

    #[test]
    fn document_structure() {
        let document = render(
            indoc! {"
                Summary: version: 1.0.0, total tests: 50, passed: 5, rate: 10.00%
                Summary: version: 1.0.0, total tests: 30, passed: 25, rate: 83.33%
                test: hget tags passed
            "},
            r#"[{"name": "hget", "tags": "basic", "skipped": false}]"#,
        );

        assert!(document.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(document.ends_with("</html>\n"));
        for expected in [
            "<title>Redis compatibility</title>",
            r#"<link rel="stylesheet" href="style.css"/>"#,
            r#"<script src="script.js">"#,
            r#"<p class="summary">30/80 (37.50%) tests passed</p>"#,
            r#"<progress value="30" max="80">37.50%</progress>"#,
            r#"<tr class="result passed">"#,
            "<summary>hget</summary>",
            "<td class=\"status\">\u{2705} Passed</td>",
        ] {
            assert!(
                document.contains(expected),
                "document does not contain {expected:?}:\n{document}"
            );
        }
        assert!(!document.contains("skipped"));

        let pre_open = r#"<pre class="definition">"#;
        let start = document.find(pre_open).expect("definition is present") + pre_open.len();
        let len = document[start..].find("</pre>").expect("definition is closed");
        assert_eq!(
            document[start..start + len].replace("&quot;", "\""),
            "{\n  \"name\": \"hget\",\n  \"tags\": \"basic\"\n}"
        );
    }

    #[test]
    fn rows_follow_input_order_with_glyphs() {
        let document = render(
            indoc! {"
                Summary: version: 1.0.0, total tests: 3, passed: 1, rate: 33.33%
                test: zadd tags skipped
                test: append tags failed
                test: hget tags passed
            "},
            r#"[{"name": "hget"}, {"name": "append"}, {"name": "zadd"}]"#,
        );

        let positions: Vec<_> = [
            "<td class=\"status\">\u{26a0}\u{fe0f} Skipped</td>",
            "<td class=\"status\">\u{274c} Failed</td>",
            "<td class=\"status\">\u{2705} Passed</td>",
        ]
        .iter()
        .map(|cell| document.find(cell).expect("status cell is present"))
        .collect();
        assert!(
            positions.windows(2).all(|pair| pair[0] < pair[1]),
            "rows are out of order:\n{document}"
        );
        assert!(document.contains(r#"<p class="summary">1/3 (33.33%) tests passed</p>"#));
    }

    #[test]
    fn text_is_escaped() {
        let document = render(
            indoc! {r#"
                Summary: version: 1.0.0, total tests: 1, passed: 0, rate: 0.00%
                test: a<b>&c tags failed
            "#},
            r#"[{"name": "a<b>&c", "command": "ECHO \"</pre>\""}]"#,
        );

        assert!(document.contains("<summary>a&lt;b"));
        assert!(document.contains("&lt;/pre"));
        assert!(!document.contains("a<b>"));
    }

    #[test]
    fn empty_results_render_an_empty_table() {
        let document = render(
            "Summary: version: 1.0.0, total tests: 4, passed: 4, rate: 100.00%\n",
            "[]",
        );
        assert!(document.contains(r#"<p class="summary">4/4 (100.00%) tests passed</p>"#));
        assert!(!document.contains("<tr class=\"result"));
    }
}
