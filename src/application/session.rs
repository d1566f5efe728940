//! Interactive session: selection state driven by input events.
//!
//! The session owns the tree and the treemap area. A windowing front end
//! feeds it events and draws `frame()`; `replay` feeds it a text script.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{hit_test, layout, Point, Rect, Tile, TreeNodeRef, WeightedTree};

/// Discrete input delivered by the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Select (or deselect) the leaf under the point
    LeftClick(Point),
    /// Discard the leaf under the point
    RightClick(Point),
    /// Grow the selected leaf
    KeyUp,
    /// Shrink the selected leaf
    KeyDown,
    Quit,
}

impl FromStr for InputEvent {
    type Err = String;

    /// Script syntax: `click X Y`, `rclick X Y`, `up`, `down`, `quit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let point = |args: &[&str]| -> Result<Point, String> {
            match args {
                [x, y] => {
                    let x = x.parse().map_err(|_| format!("invalid x coordinate: {x}"))?;
                    let y = y.parse().map_err(|_| format!("invalid y coordinate: {y}"))?;
                    Ok(Point::new(x, y))
                }
                _ => Err(format!("expected two coordinates, got {}", args.len())),
            }
        };
        match parts.as_slice() {
            ["click" | "left", args @ ..] => Ok(InputEvent::LeftClick(point(args)?)),
            ["rclick" | "right", args @ ..] => Ok(InputEvent::RightClick(point(args)?)),
            ["up"] => Ok(InputEvent::KeyUp),
            ["down"] => Ok(InputEvent::KeyDown),
            ["quit"] => Ok(InputEvent::Quit),
            _ => Err(format!("unknown event: {s}")),
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::LeftClick(p) => write!(f, "click {} {}", p.x, p.y),
            InputEvent::RightClick(p) => write!(f, "rclick {} {}", p.x, p.y),
            InputEvent::KeyUp => write!(f, "up"),
            InputEvent::KeyDown => write!(f, "down"),
            InputEvent::Quit => write!(f, "quit"),
        }
    }
}

impl InputEvent {
    /// Parse an event script, one event per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse_script(script: &str) -> ApplicationResult<Vec<InputEvent>> {
        script
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .map(|(line_no, line)| {
                line.parse()
                    .map_err(|message| ApplicationError::InvalidEvent {
                        line: line_no,
                        message,
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub enum Selection {
    #[default]
    NoSelection,
    /// `size` is the weight shown in the status line
    LeafSelected { leaf: TreeNodeRef, size: i64 },
}

/// Whether the event loop should keep polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// What the renderer needs for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tiles: Vec<Tile>,
    pub status: String,
}

#[derive(Debug)]
pub struct Session {
    tree: TreeNodeRef,
    separator: String,
    area: Rect,
    step_fraction: f64,
    selection: Selection,
}

impl Session {
    pub fn new(tree: TreeNodeRef, separator: impl Into<String>, area: Rect, step_fraction: f64) -> Self {
        Self {
            tree,
            separator: separator.into(),
            area,
            step_fraction,
            selection: Selection::NoSelection,
        }
    }

    pub fn tree(&self) -> &TreeNodeRef {
        &self.tree
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected(&self) -> Option<&TreeNodeRef> {
        match &self.selection {
            Selection::NoSelection => None,
            Selection::LeafSelected { leaf, .. } => Some(leaf),
        }
    }

    /// Apply one event. Every mutation completes before this returns.
    #[instrument(level = "debug", skip(self))]
    pub fn handle(&mut self, event: InputEvent) -> Flow {
        match event {
            InputEvent::LeftClick(point) => self.select_at(point),
            InputEvent::RightClick(point) => self.discard_at(point),
            InputEvent::KeyUp => self.resize(true),
            InputEvent::KeyDown => self.resize(false),
            InputEvent::Quit => return Flow::Quit,
        }
        debug_assert!(self.tree.borrow().is_consistent(), "weights out of sync after {event}");
        Flow::Continue
    }

    /// Status line for the current selection, empty without one.
    pub fn status(&self) -> String {
        match &self.selection {
            Selection::NoSelection => String::new(),
            Selection::LeafSelected { leaf, size } => {
                self.tree.path_from(Some(leaf), *size, &self.separator)
            }
        }
    }

    pub fn frame(&self) -> Frame {
        Frame {
            tiles: layout(&self.tree, self.area),
            status: self.status(),
        }
    }

    fn select_at(&mut self, point: Point) {
        let Some(hit) = hit_test(&self.tree, self.area, point) else {
            debug!("click on empty area");
            self.selection = Selection::NoSelection;
            return;
        };

        let reselected = self
            .selected()
            .is_some_and(|current| *current.borrow() == *hit.borrow());
        if reselected {
            debug!(leaf = hit.borrow().name(), "deselected");
            self.selection = Selection::NoSelection;
        } else {
            let size = hit.borrow().weight();
            info!(leaf = hit.borrow().name(), size, "selected");
            self.selection = Selection::LeafSelected { leaf: hit, size };
        }
    }

    fn discard_at(&mut self, point: Point) {
        let Some(hit) = hit_test(&self.tree, self.area, point) else {
            return;
        };
        // zero first: once detached the leaf can no longer be found
        let removed = self.tree.detach_and_zero(&hit);
        self.tree.remove_leaf_from_immediate_parent(&hit);
        info!(leaf = hit.borrow().name(), removed, "discarded");
        self.selection = Selection::NoSelection;
    }

    fn resize(&mut self, grow: bool) {
        let Selection::LeafSelected { leaf, .. } = &self.selection else {
            return;
        };
        // resizing acts on the first leaf with this label, so step and floor
        // must come from that leaf, not from the one that was clicked
        let Some(target) = self.tree.find_leaf(leaf) else {
            return;
        };
        let weight = target.borrow().weight();
        let step = self.tree.borrow().resize_step(weight, self.step_fraction);

        let updated = if grow {
            self.tree.increase_weight(&target, step)
        } else {
            // never shrink below 1 from the keyboard
            let step = step.min(weight - 1);
            if step <= 0 {
                Some(Rc::clone(&target))
            } else {
                self.tree.decrease_weight(&target, step)
            }
        };

        if let Some(updated) = updated {
            let size = updated.borrow().weight();
            debug!(leaf = updated.borrow().name(), size, "resized");
            self.selection = Selection::LeafSelected { leaf: updated, size };
        }
    }
}
