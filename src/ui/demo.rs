//! Built-in sample documents and in-process collaborators for the demo host.
//!
//! The demo has no language server, so a handful of small Rust sources stand in for a project.
//! Relationships are found by plain text search for the names each file exports.

use canvas_workspace::{
    CancellationToken, EditorHost, EditorIdentifier, LineMetadata, PaneSymbol, RelationshipKind,
    SymbolDescriptor, SymbolProvider, SymbolRelationship, TextRange,
};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info};

/// One sample document.
pub struct DemoFile {
    /// Document uri
    pub uri: &'static str,
    /// Path shown in pane headers
    pub path: &'static str,
    /// Names other files can reference
    pub exports: &'static [&'static str],
    /// Source text
    pub source: &'static str,
}

impl DemoFile {
    /// Source lines, 1-based lines map to index `line - 1`.
    pub fn lines(&self) -> Vec<&'static str> {
        self.source.lines().collect()
    }

    /// Range of the function or struct declaring `name`, if the file has one.
    pub fn symbol(&self, name: &str) -> Option<PaneSymbol> {
        let lines = self.lines();
        let start = lines.iter().position(|line| {
            (line.contains("fn ") || line.contains("struct ")) && line.contains(name)
        })?;
        let end = lines[start..]
            .iter()
            .position(|line| line.starts_with('}'))
            .map_or(lines.len() - 1, |offset| start + offset);
        Some(PaneSymbol {
            name: name.to_string(),
            range: TextRange {
                start_line: start as u32 + 1,
                start_column: 1,
                end_line: end as u32 + 1,
                end_column: lines[end].len() as u32 + 1,
            },
        })
    }
}

/// The sample project.
pub const DEMO_FILES: &[DemoFile] = &[
    DemoFile {
        uri: "file:///demo/src/main.rs",
        path: "src/main.rs",
        exports: &["main"],
        source: r#"use crate::server::Server;
use crate::config::Config;

fn main() {
    let config = Config::load("server.toml");
    let server = Server::bind(&config);
    server.run();
}
"#,
    },
    DemoFile {
        uri: "file:///demo/src/server.rs",
        path: "src/server.rs",
        exports: &["Server"],
        source: r#"use crate::config::Config;
use crate::handler::handle;

pub struct Server {
    address: String,
    workers: usize,
}

impl Server {
    pub fn bind(config: &Config) -> Self {
        Server {
            address: config.address.clone(),
            workers: config.workers,
        }
    }

    pub fn run(&self) {
        for request in self.accept() {
            handle(request);
        }
    }
}
"#,
    },
    DemoFile {
        uri: "file:///demo/src/config.rs",
        path: "src/config.rs",
        exports: &["Config"],
        source: r#"pub struct Config {
    pub address: String,
    pub workers: usize,
}

impl Config {
    pub fn load(path: &str) -> Self {
        let text = std::fs::read_to_string(path).unwrap_or_default();
        parse(&text)
    }
}

fn parse(text: &str) -> Config {
    Config {
        address: text.lines().next().unwrap_or("127.0.0.1:8080").to_string(),
        workers: 4,
    }
}
"#,
    },
    DemoFile {
        uri: "file:///demo/src/handler.rs",
        path: "src/handler.rs",
        exports: &["handle"],
        source: r#"use crate::server::Server;

pub fn handle(request: Request) -> Response {
    match request.path() {
        "/health" => Response::ok(),
        _ => Response::not_found(),
    }
}
"#,
    },
];

/// Looks up a sample document by uri.
pub fn demo_file(uri: &str) -> Option<&'static DemoFile> {
    DEMO_FILES.iter().find(|file| file.uri == uri)
}

/// Answers relationship and sizing queries from [`DEMO_FILES`].
#[derive(Debug, Default)]
pub struct DemoSymbolProvider;

impl DemoSymbolProvider {
    /// Lines of a descriptor's document within its range.
    fn visible_lines(descriptor: &SymbolDescriptor) -> Vec<(u32, &'static str)> {
        let Some(file) = demo_file(&descriptor.uri) else {
            return Vec::new();
        };
        file.lines()
            .into_iter()
            .enumerate()
            .map(|(index, line)| (index as u32 + 1, line))
            .filter(|(line_number, _)| match descriptor.range {
                Some(range) => (range.start_line..=range.end_line).contains(line_number),
                None => true,
            })
            .collect()
    }
}

impl SymbolProvider for DemoSymbolProvider {
    fn symbol_relationships(
        &self,
        descriptors: Vec<SymbolDescriptor>,
        token: CancellationToken,
    ) -> BoxFuture<'static, Vec<SymbolRelationship>> {
        let mut relationships = Vec::new();
        for from in &descriptors {
            let lines = Self::visible_lines(from);
            for to in descriptors.iter().filter(|to| to.uri != from.uri) {
                if token.is_cancelled() {
                    debug!("demo relationship query cancelled");
                    return futures::future::ready(Vec::new()).boxed();
                }
                let Some(target) = demo_file(&to.uri) else {
                    continue;
                };
                for (line_number, line) in &lines {
                    if target.exports.iter().any(|name| line.contains(name)) {
                        relationships.push(SymbolRelationship {
                            from: from.pane_id,
                            to: to.pane_id,
                            kind: RelationshipKind::SymbolDependency,
                            from_range: Some(TextRange::lines(*line_number, *line_number)),
                        });
                    }
                }
            }
        }
        futures::future::ready(relationships).boxed()
    }

    fn line_metadata(
        &self,
        uri: &str,
        range: Option<TextRange>,
    ) -> BoxFuture<'static, Option<LineMetadata>> {
        let metadata = demo_file(uri).map(|file| {
            let lines: Vec<&str> = file
                .lines()
                .into_iter()
                .enumerate()
                .filter(|(index, _)| match range {
                    Some(range) => {
                        (range.start_line..=range.end_line).contains(&(*index as u32 + 1))
                    }
                    None => true,
                })
                .map(|(_, line)| line)
                .collect();
            LineMetadata {
                num_lines: lines.len() as u32,
                longest_line_column: lines.iter().map(|line| line.len() as u32).max().unwrap_or(0),
            }
        });
        futures::future::ready(metadata).boxed()
    }
}

/// Stands in for the editor widgets: every close is accepted.
#[derive(Debug, Default)]
pub struct DemoEditorHost;

impl EditorHost for DemoEditorHost {
    fn close_editor(
        &self,
        identifier: EditorIdentifier,
        unconditional: bool,
    ) -> BoxFuture<'static, bool> {
        info!(
            "closing demo editor {} (unconditional: {})",
            identifier.editor, unconditional
        );
        futures::future::ready(true).boxed()
    }

    fn focus_editor(&self, identifier: EditorIdentifier) {
        debug!("focusing demo editor {}", identifier.editor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use uuid::Uuid;

    fn descriptor(uri: &str, editor: u64) -> SymbolDescriptor {
        SymbolDescriptor {
            pane_id: Uuid::new_v4(),
            uri: uri.into(),
            range: None,
            identifier: EditorIdentifier {
                group_id: 1,
                editor,
            },
        }
    }

    #[test]
    fn test_symbol_lookup_spans_declaration() {
        let server = demo_file("file:///demo/src/server.rs").unwrap();
        let symbol = server.symbol("Server").unwrap();
        assert_eq!(symbol.range.start_line, 4);
        assert_eq!(symbol.range.end_line, 7);
    }

    #[test]
    fn test_main_depends_on_server_and_config() {
        let main = descriptor("file:///demo/src/main.rs", 1);
        let server = descriptor("file:///demo/src/server.rs", 2);
        let relationships = block_on(
            DemoSymbolProvider.symbol_relationships(
                vec![main.clone(), server.clone()],
                CancellationToken::new(),
            ),
        );
        assert!(relationships
            .iter()
            .any(|relationship| relationship.from == main.pane_id && relationship.to == server.pane_id));
    }

    #[test]
    fn test_line_metadata_respects_range() {
        let metadata = block_on(
            DemoSymbolProvider.line_metadata("file:///demo/src/main.rs", Some(TextRange::lines(4, 8))),
        )
        .unwrap();
        assert_eq!(metadata.num_lines, 5);
        assert!(block_on(DemoSymbolProvider.line_metadata("file:///missing.rs", None)).is_none());
    }
}
