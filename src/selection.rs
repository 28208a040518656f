//! Pointer hit testing, click toggling and drag-rectangle selection.
//!
//! The controller only resolves pointer input to region ids. Applying the
//! resulting toggles to the operator's edits is done by [`toggle_regions`],
//! which returns the new state instead of mutating the old one.

use crate::geometry::{Point, Rect};
use crate::model::{AnnotationRegion, CategoryId, ManualEdits, RegionId};
use crate::undo::Command;

/// Minimum drag extent (in device units, both axes) for a range selection.
pub const MIN_DRAG_DISTANCE: f64 = 2.0;

/// Maps device (CSS) pointer coordinates to the canvas's internal pixels.
///
/// The canvas may be displayed at a different size than its backing store,
/// so X and Y are scaled independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMapping {
    pub internal_width: f64,
    pub internal_height: f64,
    pub displayed_width: f64,
    pub displayed_height: f64,
}

impl CanvasMapping {
    pub fn new(internal: (f64, f64), displayed: (f64, f64)) -> Self {
        Self {
            internal_width: internal.0,
            internal_height: internal.1,
            displayed_width: displayed.0,
            displayed_height: displayed.1,
        }
    }

    /// Mapping for a canvas shown at its native size.
    pub fn identity(width: f64, height: f64) -> Self {
        Self::new((width, height), (width, height))
    }

    fn scale(internal: f64, displayed: f64) -> f64 {
        if displayed > 0.0 { internal / displayed } else { 1.0 }
    }

    pub fn scale_x(&self) -> f64 {
        Self::scale(self.internal_width, self.displayed_width)
    }

    pub fn scale_y(&self) -> f64 {
        Self::scale(self.internal_height, self.displayed_height)
    }

    /// Convert a device-space point (relative to the canvas origin) to internal coordinates.
    pub fn to_internal(&self, x: f64, y: f64) -> Point {
        Point::new(x * self.scale_x(), y * self.scale_y())
    }
}

/// Topmost region containing `point`.
///
/// Regions are drawn in list order, so the last one drawn is checked first.
pub fn hit_test(regions: &[AnnotationRegion], point: Point) -> Option<RegionId> {
    regions
        .iter()
        .rev()
        .find(|region| region.contains(point.x, point.y))
        .map(|region| region.id)
}

/// Non-manual regions whose every vertex lies inside `rect`, in list order.
pub fn regions_in_rect(regions: &[AnnotationRegion], rect: &Rect) -> Vec<RegionId> {
    regions
        .iter()
        .filter(|region| !region.is_manual_added && rect.contains_all(&region.points))
        .map(|region| region.id)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    anchor_device: Point,
    current_device: Point,
    anchor: Point,
    current: Point,
}

/// What a finished pointer gesture selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A click over nothing, or over a manually added region.
    Nothing,
    /// A click over a toggleable region.
    Click(RegionId),
    /// A drag rectangle and the regions fully inside it.
    Range(Vec<RegionId>),
}

impl Selection {
    /// Region ids to toggle, in order.
    pub fn ids(&self) -> &[RegionId] {
        match self {
            Selection::Nothing => &[],
            Selection::Click(id) => std::slice::from_ref(id),
            Selection::Range(ids) => ids,
        }
    }
}

/// Pointer state machine for hover, click and range selection.
#[derive(Debug, Clone)]
pub struct SelectionController {
    mapping: CanvasMapping,
    hovered: Option<RegionId>,
    drag: Option<DragState>,
}

impl SelectionController {
    pub fn new(mapping: CanvasMapping) -> Self {
        Self {
            mapping,
            hovered: None,
            drag: None,
        }
    }

    /// Update the mapping after the canvas was resized or re-laid out.
    pub fn set_mapping(&mut self, mapping: CanvasMapping) {
        self.mapping = mapping;
    }

    pub fn mapping(&self) -> &CanvasMapping {
        &self.mapping
    }

    /// Region currently under the pointer.
    pub fn hovered(&self) -> Option<RegionId> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Live drag rectangle in internal coordinates, for drawing feedback.
    pub fn selection_rect(&self) -> Option<Rect> {
        self.drag.map(|drag| Rect::from_corners(drag.anchor, drag.current))
    }

    /// Pointer pressed: anchor a potential drag rectangle.
    pub fn pointer_down(&mut self, device_x: f64, device_y: f64) {
        let device = Point::new(device_x, device_y);
        let mapped = self.mapping.to_internal(device_x, device_y);
        if self.drag.is_some() {
            log::warn!("Starting new drag while previous drag still active - forcing end");
        }
        self.drag = Some(DragState {
            anchor_device: device,
            current_device: device,
            anchor: mapped,
            current: mapped,
        });
        log::debug!("Range drag started at ({:.1}, {:.1})", mapped.x, mapped.y);
    }

    /// Pointer moved: extend the drag rectangle, or refresh the hover hit.
    pub fn pointer_move(
        &mut self,
        regions: &[AnnotationRegion],
        device_x: f64,
        device_y: f64,
    ) -> Option<RegionId> {
        let mapped = self.mapping.to_internal(device_x, device_y);
        if let Some(drag) = &mut self.drag {
            drag.current_device = Point::new(device_x, device_y);
            drag.current = mapped;
        }
        self.hovered = hit_test(regions, mapped);
        self.hovered
    }

    /// Pointer released: finish the gesture.
    ///
    /// A drag larger than [`MIN_DRAG_DISTANCE`] on both axes selects every
    /// non-manual region fully inside the rectangle. A drag within
    /// [`MIN_DRAG_DISTANCE`] on both axes is a click on the region under the
    /// pointer. Any other gesture selects nothing.
    pub fn pointer_up(
        &mut self,
        regions: &[AnnotationRegion],
        device_x: f64,
        device_y: f64,
    ) -> Selection {
        self.pointer_move(regions, device_x, device_y);
        let Some(drag) = self.drag.take() else {
            return self.click(regions);
        };

        let device_rect = Rect::from_corners(drag.anchor_device, drag.current_device);
        let wide = device_rect.width() > MIN_DRAG_DISTANCE;
        let tall = device_rect.height() > MIN_DRAG_DISTANCE;
        if wide && tall {
            let rect = Rect::from_corners(drag.anchor, drag.current);
            let ids = regions_in_rect(regions, &rect);
            log::debug!(
                "Range drag ended: {} regions inside ({:.1}, {:.1})-({:.1}, {:.1})",
                ids.len(),
                rect.min_x,
                rect.min_y,
                rect.max_x,
                rect.max_y
            );
            return Selection::Range(ids);
        }
        if wide || tall {
            log::debug!(
                "Drag of {:.1}x{:.1} device units is too thin for a range",
                device_rect.width(),
                device_rect.height()
            );
            return Selection::Nothing;
        }
        self.click(regions)
    }

    /// Abandon any in-progress drag.
    pub fn cancel(&mut self) {
        self.drag = None;
    }

    fn click(&self, regions: &[AnnotationRegion]) -> Selection {
        let Some(id) = self.hovered else {
            return Selection::Nothing;
        };
        let manual = regions
            .iter()
            .any(|region| region.id == id && region.is_manual_added);
        if manual {
            Selection::Nothing
        } else {
            Selection::Click(id)
        }
    }
}

/// Which state a selection toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleMode {
    /// Toggle membership in the removal set.
    Removal,
    /// Toggle assignment to the active category.
    Classify(CategoryId),
}

/// Result of applying a selection to the operator's edits.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    /// Edits after the toggles.
    pub edits: ManualEdits,
    /// Undoable record of the change, `None` if nothing was toggled.
    pub command: Option<Command>,
    /// Regions that entered the removal set or the active category.
    pub added: usize,
    /// Regions that left the removal set or the active category.
    pub removed: usize,
}

/// Toggle each region independently in `mode` and return the new edits.
///
/// In [`ToggleMode::Classify`] a region already in the active category loses
/// its override; any other region is assigned the active category.
pub fn toggle_regions(edits: &ManualEdits, mode: ToggleMode, ids: &[RegionId]) -> ToggleOutcome {
    let mut next = edits.clone();
    let mut commands = Vec::with_capacity(ids.len());
    let (mut added, mut removed) = (0, 0);

    for &region_id in ids {
        let command = match mode {
            ToggleMode::Removal => {
                let now_removed = !next.is_removed(region_id);
                next.set_removed(region_id, now_removed);
                if now_removed { added += 1 } else { removed += 1 }
                Command::SetRemoved {
                    region_id,
                    removed: now_removed,
                }
            }
            ToggleMode::Classify(category) => {
                let old = next.classification.get(region_id);
                let new = if old == Some(category) {
                    removed += 1;
                    None
                } else {
                    added += 1;
                    Some(category)
                };
                next.classification.restore(region_id, new);
                Command::SetCategory { region_id, old, new }
            }
        };
        commands.push(command);
    }

    let command = match commands.len() {
        0 => None,
        1 => commands.pop(),
        n => Some(Command::Batch {
            description: format!("Toggle {n} regions"),
            commands,
        }),
    };
    if command.is_some() {
        log::info!("✅ Selection: {added} added, {removed} removed");
    }

    ToggleOutcome {
        edits: next,
        command,
        added,
        removed,
    }
}
