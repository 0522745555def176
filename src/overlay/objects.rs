//! Overlay object model: stable identities, geometry, draw commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which level family an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ObjectGroup {
    Day,
    Week,
    SessionOpen,
    Dashboard,
}

/// The role an object plays within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ObjectPart {
    HighLine,
    MidLine,
    LowLine,
    OpenLine,
    HighLabel,
    MidLabel,
    LowLabel,
    OpenLabel,
    WindowStart,
    WindowEnd,
    RangeText,
    PriceText,
}

/// Stable identity of one overlay object across ticks.
///
/// Redraw diffs maps keyed by this, so a level whose price moved is
/// updated in place instead of deleted and recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ObjectKey {
    pub group: ObjectGroup,
    pub part: ObjectPart,
}

impl ObjectKey {
    pub fn new(group: ObjectGroup, part: ObjectPart) -> Self {
        Self { group, part }
    }
}

/// Dash pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePattern {
    Solid,
    Dots,
    DotsRare,
}

/// Visual style of a line, passed through to the renderer.
///
/// Colors stay renderer-interpreted name strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyleSpec {
    pub color: String,
    pub thickness: u32,
    pub pattern: LinePattern,
}

/// Visual style of an on-chart text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub color: String,
    pub font_size: u32,
}

/// Screen corner a [`OverlayObject::ScreenText`] block is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScreenCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// One fully described drawable object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OverlayObject {
    /// Horizontal segment at one price.
    Segment {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price: f64,
        style: LineStyleSpec,
    },
    /// Short text anchored at an (instant, price) point.
    Text {
        at: DateTime<Utc>,
        price: f64,
        content: String,
        style: TextStyle,
    },
    /// Full-height marker at one instant.
    VerticalLine {
        at: DateTime<Utc>,
        style: LineStyleSpec,
    },
    /// Multi-line text pinned to a screen corner.
    ScreenText {
        corner: ScreenCorner,
        content: String,
        color: String,
    },
}

/// One reconciliation step for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Upsert {
        key: ObjectKey,
        object: OverlayObject,
    },
    Remove {
        key: ObjectKey,
    },
}

impl DrawCommand {
    pub fn key(&self) -> ObjectKey {
        match self {
            DrawCommand::Upsert { key, .. } => *key,
            DrawCommand::Remove { key } => *key,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, DrawCommand::Remove { .. })
    }
}
