// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Window inset computation.
//
// Two strategies produce the same four-edge shape. The host API level picks
// one up front; there is no retry across strategies within a layout pass.

use tether_core::error::Result;
use tether_core::types::{InsetStrategy, Insets, Rect, Size};

use crate::traits::WindowGeometry;

/// Pick the strategy a host at `api_level` supports.
pub fn select_strategy(api_level: u32, root_insets_min_api: u32) -> InsetStrategy {
    if api_level >= root_insets_min_api {
        InsetStrategy::WindowInsets
    } else {
        InsetStrategy::VisibleFrame
    }
}

/// Approximate insets by diffing the visible frame against the root view.
///
/// Everything outside the visible frame is attributed to the nearest edge, so
/// an open IME shows up as a larger bottom inset.
pub fn from_visible_frame(visible: Rect, root: Size) -> Insets {
    let (left, top) = (i64::from(visible.left), i64::from(visible.top));
    let visible_width = i64::from(visible.right) - left;
    let visible_height = i64::from(visible.bottom) - top;

    Insets::from_signed(
        top,
        i64::from(root.height) - visible_height - top,
        left,
        i64::from(root.width) - visible_width - left,
    )
}

/// Compute insets for the current layout pass.
///
/// Returns `None` when nothing should be emitted: the view is not attached
/// yet, or the host queries for the selected strategy failed.
pub fn compute<G>(geometry: &G, root_insets_min_api: u32) -> Option<(Insets, InsetStrategy)>
where
    G: WindowGeometry + ?Sized,
{
    let strategy = select_strategy(geometry.api_level(), root_insets_min_api);
    let computed = match strategy {
        InsetStrategy::WindowInsets => geometry.root_window_insets(),
        InsetStrategy::VisibleFrame => visible_frame_insets(geometry).map(Some),
    };

    match computed {
        Ok(Some(insets)) => Some((insets, strategy)),
        Ok(None) => {
            tracing::trace!("root window insets not available yet; skipping layout pass");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, ?strategy, "inset computation failed; no event this pass");
            None
        }
    }
}

fn visible_frame_insets<G>(geometry: &G) -> Result<Insets>
where
    G: WindowGeometry + ?Sized,
{
    let visible = geometry.visible_display_frame()?;
    let root = geometry.root_view_size()?;
    Ok(from_visible_frame(visible, root))
}
