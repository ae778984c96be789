//! Event-stream grouping.
//!
//! One linear pass turns the parser's event stream into a flat sequence of
//! [`Block`] variants, each carrying only what its emission needs. List
//! context is tracked here so paragraphs already know their list styling;
//! the emission pass never has to scan for matching close events.
//!
//! Tight list items deliver their text without paragraph tags, so entering
//! an item opens an implicit paragraph that is flushed when real block
//! structure (or the item's end) arrives.

use std::mem;

use primer_docx::Run;
use pulldown_cmark::{Event, HeadingLevel, Tag, TagEnd};

use crate::inline::RunCollector;
use crate::table::{TableBuilder, TableGrid};

/// Kind of the innermost list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

/// One renderable block, pre-grouped from the event stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Heading { level: u8, runs: Vec<Run> },
    Paragraph { runs: Vec<Run>, list: Option<ListKind> },
    Rule,
    CodeFence { lines: Vec<String> },
    Table { grid: TableGrid },
}

/// Group a markdown event stream into blocks.
pub fn group_blocks<'a, I>(events: I) -> Vec<Block>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut grouper = Grouper::default();
    for event in events {
        grouper.handle(event);
    }
    grouper.finish()
}

/// Per-block parsing context.
#[derive(Debug, Default)]
enum Context {
    #[default]
    Idle,
    Heading {
        level: u8,
        collector: RunCollector,
    },
    Paragraph {
        collector: RunCollector,
        /// Opened by a tight list item rather than a paragraph tag.
        implicit: bool,
    },
    Fence {
        buffer: String,
    },
    Table(TableBuilder),
}

#[derive(Debug, Default)]
struct Grouper {
    blocks: Vec<Block>,
    list_stack: Vec<ListKind>,
    item_depth: usize,
    context: Context,
}

impl Grouper {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(&tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.code(&code),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => {
                self.flush_paragraph();
                self.blocks.push(Block::Rule);
            }
            // Raw HTML, math, footnotes and task markers are not part of
            // the primer grammar; skipping keeps the pass forward-compatible.
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::List(start) => {
                self.flush_paragraph();
                self.list_stack.push(if start.is_some() {
                    ListKind::Ordered
                } else {
                    ListKind::Bullet
                });
            }
            Tag::Item => {
                self.flush_paragraph();
                self.item_depth += 1;
                self.context = Context::Paragraph {
                    collector: RunCollector::new(),
                    implicit: true,
                };
            }
            Tag::Paragraph => {
                if !matches!(self.context, Context::Table(_)) {
                    self.flush_paragraph();
                    self.context = Context::Paragraph {
                        collector: RunCollector::new(),
                        implicit: false,
                    };
                }
            }
            Tag::Heading { level, .. } => {
                self.flush_paragraph();
                self.context = Context::Heading {
                    level: heading_level_to_num(level),
                    collector: RunCollector::new(),
                };
            }
            Tag::CodeBlock(_) => {
                self.flush_paragraph();
                self.context = Context::Fence {
                    buffer: String::new(),
                };
            }
            Tag::Table(_) => {
                self.flush_paragraph();
                self.context = Context::Table(TableBuilder::new());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Context::Table(builder) = &mut self.context {
                    builder.start_row();
                }
            }
            Tag::TableCell => {
                if let Context::Table(builder) = &mut self.context {
                    builder.start_cell();
                }
            }
            // Inline containers go to the active collector; anything the
            // collector does not model is ignored there.
            other => {
                if let Some(collector) = self.collector_mut() {
                    collector.start(&other);
                }
            }
        }
    }

    fn end_tag(&mut self, tag: &TagEnd) {
        match tag {
            TagEnd::List(_) => {
                // Malformed streams can close more lists than they opened.
                self.list_stack.pop();
            }
            TagEnd::Item => {
                self.flush_paragraph();
                self.item_depth = self.item_depth.saturating_sub(1);
            }
            TagEnd::Paragraph => self.flush_paragraph(),
            TagEnd::Heading(_) => {
                if let Context::Heading { level, collector } =
                    mem::take(&mut self.context)
                {
                    self.blocks.push(Block::Heading {
                        level,
                        runs: collector.finish(),
                    });
                }
            }
            TagEnd::CodeBlock => {
                if let Context::Fence { buffer } = mem::take(&mut self.context) {
                    self.blocks.push(Block::CodeFence {
                        lines: fence_lines(&buffer),
                    });
                }
            }
            TagEnd::Table => {
                if let Context::Table(builder) = mem::take(&mut self.context) {
                    self.blocks.push(Block::Table {
                        grid: builder.finish(),
                    });
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Context::Table(builder) = &mut self.context {
                    builder.end_row();
                }
            }
            TagEnd::TableCell => {
                if let Context::Table(builder) = &mut self.context {
                    builder.end_cell();
                }
            }
            other => {
                if let Some(collector) = self.collector_mut() {
                    collector.end(other);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Context::Fence { buffer } = &mut self.context {
            buffer.push_str(text);
        } else if let Some(collector) = self.collector_mut() {
            collector.text(text);
        }
    }

    fn code(&mut self, code: &str) {
        if let Some(collector) = self.collector_mut() {
            collector.code(code);
        }
    }

    fn soft_break(&mut self) {
        if let Context::Fence { buffer } = &mut self.context {
            buffer.push('\n');
        } else if let Some(collector) = self.collector_mut() {
            collector.soft_break();
        }
    }

    fn hard_break(&mut self) {
        if let Some(collector) = self.collector_mut() {
            collector.hard_break();
        }
    }

    /// The collector currently receiving inline content, if any.
    fn collector_mut(&mut self) -> Option<&mut RunCollector> {
        match &mut self.context {
            Context::Heading { collector, .. } | Context::Paragraph { collector, .. } => {
                Some(collector)
            }
            Context::Table(builder) => builder.collector_mut(),
            Context::Idle | Context::Fence { .. } => None,
        }
    }

    /// Close an open paragraph context. An implicit (tight-item) paragraph
    /// that collected nothing leaves no block behind.
    fn flush_paragraph(&mut self) {
        if !matches!(self.context, Context::Paragraph { .. }) {
            return;
        }
        let Context::Paragraph { collector, implicit } = mem::take(&mut self.context) else {
            return;
        };
        if implicit && collector.is_empty() {
            return;
        }
        let list = if self.item_depth > 0 {
            self.list_stack.last().copied()
        } else {
            None
        };
        self.blocks.push(Block::Paragraph {
            runs: collector.finish(),
            list,
        });
    }

    /// Flush whatever context a truncated stream left open.
    fn finish(mut self) -> Vec<Block> {
        match mem::take(&mut self.context) {
            Context::Idle => {}
            Context::Heading { level, collector } => self.blocks.push(Block::Heading {
                level,
                runs: collector.finish(),
            }),
            Context::Paragraph { collector, implicit } => {
                self.context = Context::Paragraph { collector, implicit };
                self.flush_paragraph();
            }
            Context::Fence { buffer } => self.blocks.push(Block::CodeFence {
                lines: fence_lines(&buffer),
            }),
            Context::Table(builder) => self.blocks.push(Block::Table {
                grid: builder.finish(),
            }),
        }
        self.blocks
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Split fence content into lines. An all-empty fence still renders one
/// empty line.
fn fence_lines(content: &str) -> Vec<String> {
    let lines: Vec<String> = content
        .trim_end_matches('\n')
        .lines()
        .map(str::to_owned)
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}
