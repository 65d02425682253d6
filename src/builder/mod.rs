//! The resumable table builder.
//!
//! Events are fed in batches of arbitrary size; whenever a batch ends
//! mid-construct the builder reports [`FeedStatus::Pending`] and keeps
//! every half-built construct on its frame stack. The next batch picks
//! up exactly where the last one stopped: no event is replayed or
//! dropped, and the final grid is identical however the stream was
//! split.
//!
//! Untrusted structure is repaired rather than rejected: a cell with no
//! open row opens one, a close event for a construct that is not open is
//! dropped, and a table-close implicitly closes everything still open
//! inside it.

mod frame;

use crate::common::{Error, Result};
use crate::grid::cell::{CellSpec, ContentHandle, ContentUnit};
use crate::grid::table::{Caption, TableGrid};
use crate::markup::event::{ContentPayload, TableEvent};
use frame::{CaptionFrame, CellFrame, ColumnGroupFrame, Frame, TableFrame};

/// Receiver for leaf content the builder does not interpret.
///
/// The host document owns all leaf content; the builder only asks for
/// section handles and forwards payloads.
pub trait ContentSink {
    /// Open a new content section and return its handle. `is_header` is
    /// set for content inside header sections so the host can style it.
    fn new_content_section(&mut self, is_header: bool) -> ContentHandle;

    /// Append an opaque payload to a previously opened section.
    fn content(&mut self, section: ContentHandle, payload: &ContentPayload);
}

/// Outcome of one feed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Input ran out mid-table; feed more events to continue
    Pending,
    /// The outermost table closed; the grid is ready
    Complete,
}

/// Streaming builder turning [`TableEvent`]s into a [`TableGrid`].
///
/// # Examples
///
/// ```
/// use tabella::builder::{ContentSink, FeedStatus, TableBuilder};
/// use tabella::grid::ContentHandle;
/// use tabella::markup::{CellOptions, ContentPayload, TableEvent, TableOptions};
///
/// struct Sink(u32);
/// impl ContentSink for Sink {
///     fn new_content_section(&mut self, _is_header: bool) -> ContentHandle {
///         self.0 += 1;
///         ContentHandle::new(self.0 - 1)
///     }
///     fn content(&mut self, _section: ContentHandle, _payload: &ContentPayload) {}
/// }
///
/// let mut builder = TableBuilder::new(Sink(0));
/// let status = builder
///     .feed([
///         TableEvent::OpenTable(TableOptions::default()),
///         TableEvent::OpenRow { adjust: None, valign: None, background: None },
///         TableEvent::OpenCell(CellOptions { row_span: 1, col_span: 1, ..Default::default() }),
///         TableEvent::Content(ContentPayload("hello".into())),
///     ])
///     .unwrap();
/// assert_eq!(status, FeedStatus::Pending);
///
/// let status = builder
///     .feed([TableEvent::CloseCell, TableEvent::CloseRow, TableEvent::CloseTable])
///     .unwrap();
/// assert_eq!(status, FeedStatus::Complete);
///
/// let (grid, _sink) = builder.finish().unwrap();
/// assert_eq!(grid.row_count(), 1);
/// assert_eq!(grid.column_count(), 1);
/// ```
pub struct TableBuilder<S: ContentSink> {
    sink: S,
    stack: Vec<Frame>,
    finished: Option<TableGrid>,
}

/// Discriminant of the top frame, copied out so event handling can
/// borrow the stack freshly per action.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Top {
    Empty,
    Table,
    ColumnGroup,
    Section,
    Row,
    Cell,
    Caption,
}

impl<S: ContentSink> TableBuilder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            stack: Vec::new(),
            finished: None,
        }
    }

    /// Feed a batch of events.
    ///
    /// Returns [`FeedStatus::Complete`] once the outermost table has
    /// closed. Feeding further events after that is an error.
    pub fn feed<I>(&mut self, events: I) -> Result<FeedStatus>
    where
        I: IntoIterator<Item = TableEvent>,
    {
        for event in events {
            if self.finished.is_some() {
                return Err(Error::BuilderFinished);
            }
            self.dispatch(event);
        }
        Ok(if self.finished.is_some() {
            FeedStatus::Complete
        } else {
            FeedStatus::Pending
        })
    }

    /// True once the outermost table closed.
    pub fn is_complete(&self) -> bool {
        self.finished.is_some()
    }

    /// Number of constructs currently suspended on the pending stack.
    pub fn pending_depth(&self) -> usize {
        self.stack.len()
    }

    /// Consume the builder, returning the finished grid and the sink.
    pub fn finish(self) -> Result<(TableGrid, S)> {
        match self.finished {
            Some(grid) => Ok((grid, self.sink)),
            None => Err(Error::IncompleteTable),
        }
    }

    // --- event dispatch ------------------------------------------------

    /// Trampoline: implicit opens/closes hand the event back for
    /// re-dispatch against the new top frame.
    fn dispatch(&mut self, event: TableEvent) {
        let mut current = Some(event);
        while let Some(event) = current {
            current = self.step(event);
        }
    }

    fn top(&self) -> Top {
        match self.stack.last() {
            None => Top::Empty,
            Some(Frame::Table(_)) => Top::Table,
            Some(Frame::ColumnGroup(_)) => Top::ColumnGroup,
            Some(Frame::Section { .. }) => Top::Section,
            Some(Frame::Row) => Top::Row,
            Some(Frame::Cell(_)) => Top::Cell,
            Some(Frame::Caption(_)) => Top::Caption,
        }
    }

    /// Handle one event against the top frame. Returns the event back
    /// when a frame had to be implicitly opened or closed first.
    fn step(&mut self, event: TableEvent) -> Option<TableEvent> {
        use TableEvent::*;
        match self.top() {
            Top::Empty => {
                if let OpenTable(opts) = event {
                    self.stack.push(Frame::Table(TableFrame {
                        grid: TableGrid::from_options(&opts),
                        in_parent_section: false,
                    }));
                }
                // Anything else outside a table is stray and dropped.
                None
            },

            Top::Table => match event {
                OpenColumnGroup {
                    span,
                    width,
                    adjust,
                } => {
                    self.stack.push(Frame::ColumnGroup(ColumnGroupFrame {
                        span,
                        width,
                        adjust,
                        saw_column: false,
                    }));
                    None
                },
                OpenColumn {
                    span,
                    width,
                    adjust,
                } => {
                    self.grid_mut().insert_column(span, width, adjust);
                    None
                },
                OpenSection { header } => {
                    self.stack.push(Frame::Section { header });
                    None
                },
                OpenRow {
                    adjust,
                    valign,
                    background,
                } => {
                    self.grid_mut().open_row(adjust, valign, background);
                    self.stack.push(Frame::Row);
                    None
                },
                OpenCaption { top } => {
                    self.stack.push(Frame::Caption(CaptionFrame {
                        top,
                        contents: Default::default(),
                        section: None,
                    }));
                    None
                },
                OpenCell(_) | OpenTable(_) => {
                    // Structure repair: a cell (or a bare nested table)
                    // with no open row opens one.
                    self.grid_mut().open_row(None, None, None);
                    self.stack.push(Frame::Row);
                    Some(event)
                },
                CloseTable => {
                    self.finish_table();
                    None
                },
                _ => None,
            },

            Top::ColumnGroup => match event {
                OpenColumn {
                    span,
                    width,
                    adjust,
                } => {
                    let (gw, ga) = {
                        let Some(Frame::ColumnGroup(cg)) = self.stack.last_mut() else {
                            unreachable!()
                        };
                        cg.saw_column = true;
                        (cg.width, cg.adjust)
                    };
                    self.grid_mut()
                        .insert_column(span, width.or(gw), adjust.or(ga));
                    None
                },
                CloseColumnGroup => {
                    self.close_column_group();
                    None
                },
                _ => {
                    self.close_column_group();
                    Some(event)
                },
            },

            Top::Section => match event {
                OpenRow {
                    adjust,
                    valign,
                    background,
                } => {
                    let header = matches!(self.stack.last(), Some(Frame::Section { header: true }));
                    let grid = self.grid_mut();
                    grid.open_row(adjust, valign, background);
                    if header {
                        grid.mark_header_row();
                    }
                    self.stack.push(Frame::Row);
                    None
                },
                CloseSection => {
                    self.grid_mut().end_row_group();
                    self.stack.pop();
                    None
                },
                OpenSection { .. } | CloseTable => {
                    // Sibling section or table close: this group ends.
                    self.grid_mut().end_row_group();
                    self.stack.pop();
                    Some(event)
                },
                OpenCell(_) | OpenTable(_) => {
                    let header = matches!(self.stack.last(), Some(Frame::Section { header: true }));
                    let grid = self.grid_mut();
                    grid.open_row(None, None, None);
                    if header {
                        grid.mark_header_row();
                    }
                    self.stack.push(Frame::Row);
                    Some(event)
                },
                _ => None,
            },

            Top::Row => match event {
                OpenCell(opts) => {
                    let header = self.in_header_section();
                    self.stack.push(Frame::Cell(CellFrame {
                        spec: CellSpec::from_options(opts),
                        section: None,
                        header,
                    }));
                    None
                },
                Content(_) | OpenTable(_) => {
                    // Content directly in a row gets an implicit cell.
                    let header = self.in_header_section();
                    self.stack.push(Frame::Cell(CellFrame {
                        spec: CellSpec {
                            row_span: 1,
                            col_span: 1,
                            ..CellSpec::default()
                        },
                        section: None,
                        header,
                    }));
                    Some(event)
                },
                CloseRow => {
                    self.stack.pop();
                    self.grid_mut().close_row();
                    None
                },
                OpenRow { .. } | OpenSection { .. } | CloseSection | CloseTable => {
                    self.stack.pop();
                    self.grid_mut().close_row();
                    Some(event)
                },
                _ => None,
            },

            Top::Cell => match event {
                Content(payload) => {
                    let (section, header) = {
                        let Some(Frame::Cell(cf)) = self.stack.last() else {
                            unreachable!()
                        };
                        (cf.section, cf.header)
                    };
                    let section = match section {
                        Some(s) => s,
                        None => {
                            let s = self.sink.new_content_section(header);
                            let Some(Frame::Cell(cf)) = self.stack.last_mut() else {
                                unreachable!()
                            };
                            cf.section = Some(s);
                            cf.spec.contents.push(ContentUnit::Leaf(s));
                            s
                        },
                    };
                    self.sink.content(section, &payload);
                    None
                },
                OpenTable(opts) => {
                    let in_parent_section = {
                        let Some(Frame::Cell(cf)) = self.stack.last() else {
                            unreachable!()
                        };
                        cf.section.is_some()
                    };
                    self.stack.push(Frame::Table(TableFrame {
                        grid: TableGrid::from_options(&opts),
                        in_parent_section,
                    }));
                    None
                },
                CloseCell => {
                    self.close_cell();
                    None
                },
                OpenCell(_) | OpenRow { .. } | CloseRow | OpenSection { .. } | CloseSection
                | CloseTable => {
                    self.close_cell();
                    Some(event)
                },
                _ => None,
            },

            Top::Caption => match event {
                Content(payload) => {
                    let section = {
                        let Some(Frame::Caption(cap)) = self.stack.last() else {
                            unreachable!()
                        };
                        cap.section
                    };
                    let section = match section {
                        Some(s) => s,
                        None => {
                            let s = self.sink.new_content_section(false);
                            let Some(Frame::Caption(cap)) = self.stack.last_mut() else {
                                unreachable!()
                            };
                            cap.section = Some(s);
                            cap.contents.push(s);
                            s
                        },
                    };
                    self.sink.content(section, &payload);
                    None
                },
                CloseCaption => {
                    self.close_caption();
                    None
                },
                CloseTable => {
                    self.close_caption();
                    Some(event)
                },
                _ => None,
            },
        }
    }

    /// The grid of the innermost table frame. The dispatch arms only
    /// call this while at least one table frame is stacked.
    fn grid_mut(&mut self) -> &mut TableGrid {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Table(tf) = frame {
                return &mut tf.grid;
            }
        }
        unreachable!("no table frame on the builder stack")
    }

    fn in_header_section(&self) -> bool {
        for frame in self.stack.iter().rev() {
            match frame {
                Frame::Section { header } => return *header,
                Frame::Table(_) => return false,
                _ => {},
            }
        }
        false
    }

    fn close_column_group(&mut self) {
        let Some(Frame::ColumnGroup(cg)) = self.stack.pop() else {
            unreachable!()
        };
        let grid = self.grid_mut();
        if !cg.saw_column && cg.span > 0 {
            grid.insert_column(cg.span, cg.width, cg.adjust);
        }
        grid.close_column_group();
    }

    fn close_cell(&mut self) {
        let Some(Frame::Cell(cf)) = self.stack.pop() else {
            unreachable!()
        };
        self.grid_mut().insert_cell(cf.spec);
    }

    fn close_caption(&mut self) {
        let Some(Frame::Caption(cap)) = self.stack.pop() else {
            unreachable!()
        };
        self.grid_mut().set_caption(Caption {
            top: cap.top,
            contents: cap.contents,
        });
    }

    /// Pop and close the innermost table, attaching it to the enclosing
    /// cell or finishing the build.
    fn finish_table(&mut self) {
        let Some(Frame::Table(tf)) = self.stack.pop() else {
            unreachable!()
        };
        let mut grid = tf.grid;
        grid.close();

        match self.stack.last_mut() {
            None => {
                if !grid.has_cells() {
                    // A table with no cells synthesizes a 1x1 content
                    // slot so the model has something to anchor.
                    let slot = self.sink.new_content_section(false);
                    grid.set_default_slot(slot);
                }
                self.finished = Some(grid);
            },
            Some(Frame::Cell(cf)) => {
                if grid.is_overflowed() {
                    // Abandoned nested table degrades to an empty cell.
                    return;
                }
                if !grid.has_cells() {
                    if tf.in_parent_section {
                        // The cell already holds content; an empty
                        // nested table adds nothing.
                        return;
                    }
                    let slot = self.sink.new_content_section(false);
                    grid.set_default_slot(slot);
                }
                cf.spec.contents.push(ContentUnit::Table(Box::new(grid)));
                // A following text run needs a fresh section.
                cf.section = None;
            },
            Some(_) => {
                // Degenerate nesting; drop the orphan table.
            },
        }
    }
}
