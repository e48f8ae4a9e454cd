//! Document scanning: find channel blocks and overview placeholders in a
//! document's text.
//!
//! Directive form:
//!
//! .. asyncapi_channels::
//!    :format: yaml
//!
//!    crazy_horse/<id>/state:
//!      publish:
//!        summary: Current crazy horse status
//!
//! .. asyncapi_overview:: publish
//!
//! Option lines (`:key: value`) come first inside a channel block, then the
//! block body. Anything outside a directive stays as prose. Other
//! directives are not ours and pass through as prose too.

use crate::Result;
use crate::channel::{BlockFormat, BlockOptions, Operation};
use crate::diagnostics::Diagnostic;
use regex::Regex;

const CHANNELS_DIRECTIVE: &str = "asyncapi_channels";
const OVERVIEW_DIRECTIVE: &str = "asyncapi_overview";

/// `.. name:: argument`
const DIRECTIVE_RE: &str = r"^(\s*)\.\.\s+(\w+)::\s*(.*)$";
/// `:key: value` at the start of a block body.
const OPTION_RE: &str = r"^:([A-Za-z_][\w-]*):\s*(.*)$";

#[derive(Debug, Clone)]
pub enum DocBlock {
    Prose(String),
    Channels {
        options: BlockOptions,
        content: String,
        line: usize,
    },
    Overview {
        operation: Operation,
        line: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Document {
    pub docname: String,
    pub blocks: Vec<DocBlock>,
}

/// Scan a document for directives. Malformed directive usage (unknown
/// options, bad overview arguments) is reported and skipped; the rest of
/// the document still parses.
pub fn parse_document(docname: &str, text: &str) -> Result<(Document, Vec<Diagnostic>)> {
    let directive_re = Regex::new(DIRECTIVE_RE)?;
    let option_re = Regex::new(OPTION_RE)?;

    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut diags = Vec::new();
    let mut prose: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let lineno = i + 1;

        let directive = directive_re
            .captures(line)
            .filter(|caps| matches!(&caps[2], CHANNELS_DIRECTIVE | OVERVIEW_DIRECTIVE));
        let Some(caps) = directive else {
            prose.push(line);
            i += 1;
            continue;
        };

        flush_prose(&mut prose, &mut blocks);
        let indent = caps[1].len();
        let argument = caps[3].trim().to_string();

        if &caps[2] == OVERVIEW_DIRECTIVE {
            match Operation::parse(&argument) {
                Some(operation) => blocks.push(DocBlock::Overview {
                    operation,
                    line: lineno,
                }),
                None => diags.push(
                    Diagnostic::warning(format!(
                        "overview operation '{argument}' not recognized \
                         (expected publish/subscribe or PUB/SUB)"
                    ))
                    .at(format!("{docname}:{lineno}")),
                ),
            }
            i += 1;
            continue;
        }

        // Channel block: consume the indented body.
        let body_start = i + 1;
        let mut j = body_start;
        while j < lines.len() {
            let l = lines[j];
            if l.trim().is_empty() {
                j += 1;
                continue;
            }
            if l.len() - l.trim_start().len() <= indent {
                break;
            }
            j += 1;
        }
        let (options, content) = read_block_body(
            &lines[body_start..j],
            &option_re,
            &format!("{docname}:{lineno}"),
            &mut diags,
        );
        blocks.push(DocBlock::Channels {
            options,
            content,
            line: lineno,
        });
        i = j;
    }
    flush_prose(&mut prose, &mut blocks);

    Ok((
        Document {
            docname: docname.to_string(),
            blocks,
        },
        diags,
    ))
}

fn flush_prose(prose: &mut Vec<&str>, blocks: &mut Vec<DocBlock>) {
    let text = prose.join("\n");
    prose.clear();
    if !text.trim().is_empty() {
        blocks.push(DocBlock::Prose(text));
    }
}

/// Split a block body into its leading option lines and the dedented
/// content.
fn read_block_body(
    body: &[&str],
    option_re: &Regex,
    location: &str,
    diags: &mut Vec<Diagnostic>,
) -> (BlockOptions, String) {
    let dedent = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let dedented: Vec<&str> = body
        .iter()
        .map(|l| if l.trim().is_empty() { "" } else { &l[dedent..] })
        .collect();

    let mut options = BlockOptions::default();
    let mut idx = 0;
    while idx < dedented.len() {
        let line = dedented[idx].trim_end();
        let Some(caps) = option_re.captures(line) else {
            break;
        };
        apply_option(&mut options, &caps[1], caps[2].trim(), location, diags);
        idx += 1;
    }
    // One blank run separates options from content.
    while idx < dedented.len() && dedented[idx].is_empty() {
        idx += 1;
    }

    let mut content = dedented[idx..].join("\n");
    while content.ends_with('\n') {
        content.pop();
    }
    if !content.is_empty() {
        content.push('\n');
    }
    (options, content)
}

fn apply_option(
    options: &mut BlockOptions,
    key: &str,
    value: &str,
    location: &str,
    diags: &mut Vec<Diagnostic>,
) {
    match key {
        "format" => match BlockFormat::parse(value) {
            Some(format) => options.format = format,
            None => diags.push(
                Diagnostic::warning(format!("unknown channel block format '{value}'"))
                    .at(location.to_string()),
            ),
        },
        "from_file" => options.from_file = Some(value.to_string()),
        "name" => options.name = Some(value.to_string()),
        "class" => {
            options.classes = value.split_whitespace().map(str::to_string).collect();
        }
        other => diags.push(
            Diagnostic::warning(format!("unknown option ':{other}:' ignored"))
                .at(location.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scans_channel_block_with_options_and_content() {
        let text = "Intro prose.\n\
                    \n\
                    .. asyncapi_channels::\n\
                    \x20  :format: yaml\n\
                    \x20  :name: state\n\
                    \n\
                    \x20  t/a:\n\
                    \x20    publish:\n\
                    \x20      summary: s\n\
                    \n\
                    Closing prose.\n";
        let (doc, diags) = parse_document("doc", text).unwrap();
        assert_eq!(diags, vec![]);
        assert_eq!(doc.blocks.len(), 3);
        let DocBlock::Channels {
            options,
            content,
            line,
        } = &doc.blocks[1]
        else {
            panic!("expected a channel block, got {:?}", doc.blocks[1]);
        };
        assert_eq!(*line, 3);
        assert_eq!(options.format, BlockFormat::Yaml);
        assert_eq!(options.name.as_deref(), Some("state"));
        assert_eq!(content, "t/a:\n  publish:\n    summary: s\n");
    }

    #[test]
    fn scans_overview_placeholder() {
        let (doc, diags) = parse_document("doc", ".. asyncapi_overview:: publish\n").unwrap();
        assert_eq!(diags, vec![]);
        match doc.blocks.as_slice() {
            [DocBlock::Overview { operation, line }] => {
                assert_eq!(*operation, Operation::Publish);
                assert_eq!(*line, 1);
            }
            other => panic!("expected one overview block, got {other:?}"),
        }
    }

    #[test]
    fn overview_accepts_the_abbreviated_vocabulary() {
        let (doc, _) = parse_document("doc", ".. asyncapi_overview:: SUB\n").unwrap();
        assert!(matches!(
            doc.blocks.as_slice(),
            [DocBlock::Overview {
                operation: Operation::Subscribe,
                ..
            }]
        ));
    }

    #[test]
    fn bad_overview_argument_warns_and_is_dropped() {
        let (doc, diags) = parse_document("doc", ".. asyncapi_overview:: broadcast\n").unwrap();
        assert_eq!(doc.blocks.len(), 0);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'broadcast' not recognized"));
        assert_eq!(diags[0].location.as_deref(), Some("doc:1"));
    }

    #[test]
    fn unknown_option_warns_but_keeps_the_block() {
        let text = ".. asyncapi_channels::\n\
                    \x20  :format: yaml\n\
                    \x20  :color: red\n\
                    \n\
                    \x20  t/a:\n\
                    \x20    publish:\n\
                    \x20      summary: s\n";
        let (doc, diags) = parse_document("doc", text).unwrap();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains(":color:"));
        assert!(matches!(doc.blocks.as_slice(), [DocBlock::Channels { .. }]));
    }

    #[test]
    fn foreign_directives_stay_prose() {
        let text = ".. note::\n   Not ours.\n";
        let (doc, diags) = parse_document("doc", text).unwrap();
        assert_eq!(diags, vec![]);
        assert!(matches!(doc.blocks.as_slice(), [DocBlock::Prose(_)]));
    }

    #[test]
    fn indented_directive_owns_only_its_deeper_block() {
        // The directive sits inside an indented context (as in a source
        // comment); its body ends where indentation falls back.
        let text = "\x20   .. asyncapi_channels::\n\
                    \x20      :format: yaml\n\
                    \n\
                    \x20      t/a:\n\
                    \x20        publish:\n\
                    \x20          summary: s\n\
                    \x20   back at comment level\n";
        let (doc, _) = parse_document("doc", text).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        let DocBlock::Channels { content, .. } = &doc.blocks[0] else {
            panic!("expected channel block first");
        };
        assert_eq!(content, "t/a:\n  publish:\n    summary: s\n");
        assert!(matches!(&doc.blocks[1], DocBlock::Prose(_)));
    }
}
