use anyhow::{Context, Result};
use lookback_core::Document;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A StackOverflow post, as exported by the Look Back tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Post {
    #[serde(rename_all = "camelCase")]
    Question {
        id: u64,
        html_body: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        tags: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Answer { id: u64, question_id: u64, html_body: String },
}

impl Post {
    pub fn id(&self) -> u64 {
        match self {
            Post::Question { id, .. } | Post::Answer { id, .. } => *id,
        }
    }

    /// A question is its own question.
    pub fn question_id(&self) -> u64 {
        match self {
            Post::Question { id, .. } => *id,
            Post::Answer { question_id, .. } => *question_id,
        }
    }

    pub fn html_body(&self) -> &str {
        match self {
            Post::Question { html_body, .. } | Post::Answer { html_body, .. } => html_body,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Post::Question { .. } => "question",
            Post::Answer { .. } => "answer",
        }
    }

    /// The text that gets indexed: the title (for questions) and the body.
    pub fn indexed_text(&self) -> String {
        match self {
            Post::Question { title, html_body, .. } if !title.is_empty() => format!("{title}\n{html_body}"),
            _ => self.html_body().to_string(),
        }
    }
}

pub fn load_posts(path: &Path) -> Result<Vec<Post>> {
    let f = File::open(path).with_context(|| format!("opening posts file {}", path.display()))?;
    let posts: Vec<Post> =
        serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing posts file {}", path.display()))?;
    Ok(posts)
}

/// Turn posts into corpus documents, keeping their order.
pub fn corpus(posts: Vec<Post>) -> impl Iterator<Item = Document<Post>> {
    posts.into_iter().map(|post| {
        let text = post.indexed_text();
        let id = post.id().to_string();
        Document::new(text, post).with_external_id(id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_variants() {
        let json = r#"[
            {"type": "question", "id": 1, "questionId": 1, "htmlBody": "<p>q</p>", "title": "How?", "tags": ["rust"]},
            {"type": "answer", "id": 2, "questionId": 1, "htmlBody": "<p>a</p>"}
        ]"#;
        let posts: Vec<Post> = serde_json::from_str(json).unwrap();
        assert_eq!(posts[0].kind(), "question");
        assert_eq!(posts[0].question_id(), 1);
        assert_eq!(posts[0].indexed_text(), "How?\n<p>q</p>");
        assert_eq!(posts[1].kind(), "answer");
        assert_eq!(posts[1].id(), 2);
        assert_eq!(posts[1].question_id(), 1);
        assert_eq!(posts[1].indexed_text(), "<p>a</p>");
    }

    #[test]
    fn corpus_keeps_order_and_ids() {
        let posts = vec![
            Post::Answer { id: 7, question_id: 3, html_body: "x".into() },
            Post::Answer { id: 5, question_id: 3, html_body: "y".into() },
        ];
        let docs: Vec<_> = corpus(posts).collect();
        assert_eq!(docs[0].external_id.as_deref(), Some("7"));
        assert_eq!(docs[1].external_id.as_deref(), Some("5"));
    }
}
