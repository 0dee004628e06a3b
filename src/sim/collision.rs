//! Landing and proximity checks
//!
//! Platforms are one-way: the ghost only collides with a platform's top, and
//! only when its feet crossed that top during the current step. Walking
//! through a platform from the side or jumping up through it never collides.

use glam::Vec2;

use super::level::Rect;

/// Find the platform the player lands on this step.
///
/// `body` is the player box after integration, `previous_bottom` the box's
/// bottom edge before the vertical move. Returns the top `y` of the landing
/// platform; when several qualify the last one in the list wins.
pub fn land_on_platforms(body: &Rect, previous_bottom: f32, platforms: &[Rect]) -> Option<f32> {
    let center_x = body.center_x();
    let bottom = body.bottom();

    let mut landing = None;
    for plat in platforms {
        if !plat.spans_x(center_x) {
            continue;
        }
        if bottom > plat.top() && previous_bottom <= plat.top() {
            landing = Some(plat.top());
        }
    }
    landing
}

/// Offset from an anchor to the ghost's center
#[inline]
pub fn offset_to(anchor: Vec2, ghost_center: Vec2) -> Vec2 {
    ghost_center - anchor
}
