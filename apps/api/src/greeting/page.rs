//! Server-rendered landing page built from the greeting lines.

use crate::greeting::{GreetingLine, LineKind};

const PAGE_TITLE: &str = "Gluks";
const PAGE_DESCRIPTION: &str = "Gluks Chatbot Assistant.";

pub fn render_page(lines: &[GreetingLine]) -> String {
    let body: String = lines.iter().map(render_line).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="pt">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1">
<title>{PAGE_TITLE}</title>
<meta name="description" content="{PAGE_DESCRIPTION}">
<style>
  .greeting {{ max-width: 48rem; margin: 4rem auto; padding: 0 2rem; font-family: sans-serif; }}
  .line {{ opacity: 0; transform: translateY(10px); animation: reveal 0.4s ease-out forwards; }}
  .headline {{ font-size: 1.875rem; font-weight: 700; }}
  .welcome {{ margin-top: 1.5rem; color: #a1a1aa; }}
  @keyframes reveal {{ to {{ opacity: 1; transform: translateY(0); }} }}
</style>
</head>
<body>
<main class="greeting">
{body}</main>
</body>
</html>
"#
    )
}

fn render_line(line: &GreetingLine) -> String {
    let class = match line.kind {
        LineKind::Headline => "headline",
        LineKind::Contact => "contact",
        LineKind::Portfolio => "portfolio",
        LineKind::Welcome => "welcome",
    };
    format!(
        "<div class=\"line {class}\" style=\"animation-delay: {}ms\">{}</div>\n",
        line.delay_ms,
        html_escape::encode_text(&line.text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_text_is_escaped() {
        let html = render_line(&GreetingLine {
            kind: LineKind::Contact,
            text: "Tom & <b>Jerry</b>".into(),
            delay_ms: 500,
        });
        assert_eq!(
            html,
            "<div class=\"line contact\" style=\"animation-delay: 500ms\">Tom &amp; &lt;b&gt;Jerry&lt;/b&gt;</div>\n"
        );
    }

    #[test]
    fn test_page_contains_escaped_lines_with_delays() {
        let lines = vec![GreetingLine {
            kind: LineKind::Headline,
            text: "Olá, sou <script>!".into(),
            delay_ms: 300,
        }];
        let html = render_page(&lines);
        assert!(html.contains("<div class=\"line headline\" style=\"animation-delay: 300ms\">"));
        assert!(html.contains("Olá, sou &lt;script&gt;!"));
        assert!(!html.contains("<script>"));
    }
}
