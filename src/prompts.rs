//! Prompt builders for the two LLM stages and the search tool description.
//!
//! The extraction prompt constrains output to at most four space-separated
//! terms and names the generic words the model must ignore. The synthesis
//! prompt fixes the JSON shape of the reply; sampling varies the phrasing,
//! never the shape.

use serde_json::json;

use crate::llm::ToolSpec;
use crate::response::BookRecord;

pub const SEARCH_TOOL_NAME: &str = "search_open_library";

/// Keyword-extraction prompt: natural-language query → ≤4 search terms.
pub fn extraction_prompt(query: &str) -> String {
    format!(
        "Extract up to 4 concise, space-separated keywords, genres, author names, \
         or titles from the user query below, ignoring generic words \
         (e.g., books, library, top, find, help, strong, small, big). \
         Return only the keywords in a single space-separated string.\n\n\
         User query: {query}\nSearch Keywords:"
    )
}

/// Synthesis prompt: original query + found books → strict-JSON response.
pub fn synthesis_prompt(query: &str, books: &str) -> String {
    format!(
        "You are a helpful librarian assistant for 'Book Search'.\n\
         User request: \"{query}\"\n\
         Books found:\n\
         {books}\n\n\
         Respond ONLY in this JSON format:\n\
         {{\n\
         \x20 \"greeting\": \"<friendly greeting>\",\n\
         \x20 \"books\": [\n\
         \x20   {{\n\
         \x20     \"title\": \"<book title>\",\n\
         \x20     \"author\": \"<author name>\",\n\
         \x20     \"description\": \"<one-sentence reason why this book matches the user's request>\"\n\
         \x20   }}\n\
         \x20 ],\n\
         \x20 \"conclusion\": \"<engaging closing question or prompt>\"\n\
         }}\n\n\
         Instructions:\n\
         - Use only the provided book data.\n\
         - Do not invent details.\n\
         - Keep descriptions brief and relevant.\n\
         - Conclude with a question to encourage further interaction.\n\
         - Respond with valid JSON only."
    )
}

/// Render found records as the bullet list embedded in the synthesis prompt.
pub fn format_records(records: &[BookRecord]) -> String {
    records
        .iter()
        .map(|b| {
            format!(
                "- Title: {}, Author: {}, Year: {}, Subjects: {}",
                b.title, b.author, b.published_year, b.subject
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The single capability exposed on the tool-calling path.
pub fn search_tool_spec() -> ToolSpec {
    ToolSpec {
        name: SEARCH_TOOL_NAME,
        description: "Searches for books based on keywords like title, author, or genre.",
        parameters: json!({
            "type": "object",
            "properties": {
                "search_terms": {
                    "type": "string",
                    "description": "The keywords to search for. e.g., 'dune frank herbert' or 'romance mystery female lead'.",
                },
            },
            "required": ["search_terms"],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_prompt_embeds_query_and_stop_words() {
        let p = extraction_prompt("find me the top space opera books");
        assert!(p.contains("find me the top space opera books"));
        assert!(p.contains("up to 4"));
        assert!(p.contains("library, top, find"));
    }

    #[test]
    fn synthesis_prompt_fixes_the_shape() {
        let p = synthesis_prompt("dune", "- Title: Dune");
        assert!(p.contains("\"greeting\""));
        assert!(p.contains("\"books\""));
        assert!(p.contains("\"conclusion\""));
        assert!(p.contains("valid JSON only"));
        assert!(p.contains("Do not invent details."));
        assert!(p.contains("- Title: Dune"));
    }

    #[test]
    fn records_format_one_line_each() {
        let records = vec![
            BookRecord {
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                published_year: "1965".into(),
                subject: "Science fiction".into(),
            },
            BookRecord {
                title: "Hyperion".into(),
                author: "Dan Simmons".into(),
                published_year: "1989".into(),
                subject: "n/a".into(),
            },
        ];
        let text = format_records(&records);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("- Title: Dune, Author: Frank Herbert, Year: 1965"));
    }

    #[test]
    fn tool_spec_requires_search_terms() {
        let spec = search_tool_spec();
        assert_eq!(spec.name, SEARCH_TOOL_NAME);
        assert_eq!(spec.parameters["required"][0], "search_terms");
    }
}
