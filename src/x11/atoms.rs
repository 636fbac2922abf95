//! Interned atoms and hint layouts used by the X11 backend

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ConnectionExt as _};

use crate::error::PlatformResult;

/// Atoms the window backend reads or writes
#[derive(Debug, Clone, Copy, Default)]
pub struct Atoms {
    pub net_active_window: Atom,
    pub net_wm_name: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_fullscreen: Atom,
    pub net_wm_state_maximized_vert: Atom,
    pub net_wm_state_maximized_horz: Atom,
    pub net_wm_state_hidden: Atom,
    pub net_wm_state_above: Atom,
    pub net_wm_moveresize: Atom,
    pub net_workarea: Atom,
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_state: Atom,
    pub wm_change_state: Atom,
    pub utf8_string: Atom,
    pub motif_wm_hints: Atom,
}

impl Atoms {
    pub fn new<C: Connection>(conn: &C) -> PlatformResult<Self> {
        let intern = |name: &str| -> PlatformResult<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_fullscreen: intern("_NET_WM_STATE_FULLSCREEN")?,
            net_wm_state_maximized_vert: intern("_NET_WM_STATE_MAXIMIZED_VERT")?,
            net_wm_state_maximized_horz: intern("_NET_WM_STATE_MAXIMIZED_HORZ")?,
            net_wm_state_hidden: intern("_NET_WM_STATE_HIDDEN")?,
            net_wm_state_above: intern("_NET_WM_STATE_ABOVE")?,
            net_wm_moveresize: intern("_NET_WM_MOVERESIZE")?,
            net_workarea: intern("_NET_WORKAREA")?,
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
            wm_state: intern("WM_STATE")?,
            wm_change_state: intern("WM_CHANGE_STATE")?,
            utf8_string: intern("UTF8_STRING")?,
            motif_wm_hints: intern("_MOTIF_WM_HINTS")?,
        })
    }
}

/// `_NET_WM_STATE` client message actions
pub const NET_WM_STATE_REMOVE: u32 = 0;
pub const NET_WM_STATE_ADD: u32 = 1;

/// Pointer-driven move direction of `_NET_WM_MOVERESIZE`
pub const NET_WM_MOVERESIZE_MOVE: u32 = 8;

/// ICCCM `WM_STATE` value of a minimized window
pub const ICONIC_STATE: u32 = 3;

/// MOTIF WM hints, the first three of the five 32-bit property values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotifWmHints {
    pub flags: u32,
    pub functions: u32,
    pub decorations: u32,
}

impl MotifWmHints {
    pub const MWM_HINTS_FUNCTIONS: u32 = 1 << 0;
    pub const MWM_HINTS_DECORATIONS: u32 = 1 << 1;

    pub const MWM_FUNC_RESIZE: u32 = 1 << 1;
    pub const MWM_FUNC_MOVE: u32 = 1 << 2;
    pub const MWM_FUNC_MINIMIZE: u32 = 1 << 3;
    pub const MWM_FUNC_MAXIMIZE: u32 = 1 << 4;
    pub const MWM_FUNC_CLOSE: u32 = 1 << 5;

    /// Hints for a window that draws its own frame
    ///
    /// The window manager never decorates; only the functions it may offer
    /// follow the style.
    pub fn self_drawn(resizable: bool, maximizable: bool) -> Self {
        let mut functions = Self::MWM_FUNC_MOVE | Self::MWM_FUNC_MINIMIZE | Self::MWM_FUNC_CLOSE;
        if resizable {
            functions |= Self::MWM_FUNC_RESIZE;
        }
        if maximizable {
            functions |= Self::MWM_FUNC_MAXIMIZE;
        }
        Self {
            flags: Self::MWM_HINTS_FUNCTIONS | Self::MWM_HINTS_DECORATIONS,
            functions,
            decorations: 0,
        }
    }

    pub fn to_property(self) -> [u32; 5] {
        [self.flags, self.functions, self.decorations, 0, 0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_drawn_hints_never_decorate() {
        let hints = MotifWmHints::self_drawn(true, true);
        assert_eq!(hints.decorations, 0);
        assert_ne!(hints.functions & MotifWmHints::MWM_FUNC_RESIZE, 0);
        assert_eq!(hints.to_property()[0], 0b11);

        let fixed = MotifWmHints::self_drawn(false, false);
        assert_eq!(fixed.functions & MotifWmHints::MWM_FUNC_RESIZE, 0);
        assert_eq!(fixed.functions & MotifWmHints::MWM_FUNC_MAXIMIZE, 0);
    }
}
