//! Text rendering of search results for LLM and human readers.

use crate::kagi::{OrganicResult, SearchResponse};

/// Numbering runs across all queries; errored responses take no numbers.
pub fn format_search_results(queries: &[String], responses: &[SearchResponse]) -> String {
    let mut next_number = 1;

    queries
        .iter()
        .zip(responses)
        .map(|(query, response)| {
            let body = match response.error() {
                Some(error) => format!("ERROR: {error}"),
                None => response
                    .organic_results()
                    .map(|result| {
                        let rendered = format_result(next_number, result);
                        next_number += 1;
                        rendered
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            };
            format_query_block(query, &body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_query_block(query: &str, body: &str) -> String {
    format!("-----\nResults for search query \"{query}\":\n-----\n{body}")
}

fn format_result(number: usize, result: &OrganicResult) -> String {
    format!(
        "{number}: {}\n{}\nPublished Date: {}\n{}",
        result.title(),
        result.url(),
        result.published(),
        result.snippet()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kagi::{NOT_AVAILABLE, ResultItem};

    fn organic(title: &str) -> ResultItem {
        ResultItem::Organic(OrganicResult {
            title: Some(title.to_string()),
            url: Some(format!("https://example.com/{title}")),
            snippet: Some(format!("About {title}")),
            published: Some("2024-05-01T00:00:00Z".to_string()),
        })
    }

    fn response(titles: &[&str]) -> SearchResponse {
        SearchResponse::new(titles.iter().map(|title| organic(title)).collect())
    }

    fn queries(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn numbers(output: &str) -> Vec<usize> {
        output
            .lines()
            .filter_map(|line| line.split_once(": "))
            .filter_map(|(prefix, _)| prefix.parse().ok())
            .collect()
    }

    #[test]
    fn renders_single_query_block() {
        let output = format_search_results(&queries(&["rust"]), &[response(&["book"])]);

        assert_eq!(
            output,
            "-----\n\
             Results for search query \"rust\":\n\
             -----\n\
             1: book\n\
             https://example.com/book\n\
             Published Date: 2024-05-01T00:00:00Z\n\
             About book"
        );
    }

    #[test]
    fn numbering_continues_across_queries() {
        let output = format_search_results(
            &queries(&["first", "second"]),
            &[response(&["a", "b", "c"]), response(&["d", "e"])],
        );

        assert_eq!(numbers(&output), vec![1, 2, 3, 4, 5]);
        assert!(output.contains("4: d\n"));
        assert!(output.contains("5: e\n"));
    }

    #[test]
    fn errored_query_renders_message_and_takes_no_numbers() {
        let mut failed = response(&["ignored"]);
        failed.error = Some("Insufficient credit".to_string());

        let output = format_search_results(
            &queries(&["one", "two", "three"]),
            &[response(&["a", "b"]), failed, response(&["c"])],
        );

        assert!(output.contains(
            "Results for search query \"two\":\n-----\nERROR: Insufficient credit\n\n-----"
        ));
        assert!(!output.contains("ignored"));
        assert_eq!(numbers(&output), vec![1, 2, 3]);
        assert!(output.contains("3: c\n"));
    }

    #[test]
    fn related_searches_are_not_rendered() {
        let mut mixed = response(&["a"]);
        mixed
            .data
            .insert(0, ResultItem::RelatedSearches(vec!["suggested".into()]));
        mixed.data.push(ResultItem::Unrecognized);
        mixed.data.push(organic("b"));

        let output = format_search_results(&queries(&["q"]), &[mixed]);

        assert!(!output.contains("suggested"));
        assert_eq!(numbers(&output), vec![1, 2]);
    }

    #[test]
    fn missing_fields_fall_back_independently() {
        let partial = SearchResponse::new(vec![ResultItem::Organic(OrganicResult {
            title: Some("Only title".to_string()),
            snippet: Some("Only snippet".to_string()),
            ..Default::default()
        })]);

        let output = format_search_results(&queries(&["q"]), &[partial]);

        assert!(output.ends_with(&format!(
            "1: Only title\n{NOT_AVAILABLE}\nPublished Date: {NOT_AVAILABLE}\nOnly snippet"
        )));
    }

    #[test]
    fn query_without_organic_results_renders_empty_body() {
        let output = format_search_results(
            &queries(&["nothing", "something"]),
            &[SearchResponse::default(), response(&["x"])],
        );

        assert!(output.starts_with("-----\nResults for search query \"nothing\":\n-----\n\n\n-----"));
        assert_eq!(numbers(&output), vec![1]);
    }

    #[test]
    fn output_is_deterministic() {
        let input_queries = queries(&["a", "b"]);
        let input_responses = [response(&["x", "y"]), SearchResponse::failed("boom")];

        let first = format_search_results(&input_queries, &input_responses);
        let second = format_search_results(&input_queries, &input_responses);

        assert_eq!(first, second);
    }

    #[test]
    fn mismatched_lengths_render_aligned_prefix() {
        let output = format_search_results(&queries(&["a", "b"]), &[response(&["x"])]);

        assert!(output.contains("\"a\""));
        assert!(!output.contains("\"b\""));
    }
}
