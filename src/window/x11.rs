//! X11 window source (Xlib)
//!
//! Focus from `XGetInputFocus`, class list from `WM_CLASS` (STRING),
//! name from `_NET_WM_NAME` (UTF8_STRING), ancestry from `XQueryTree`.

use anyhow::{anyhow, Result};
use log::{error, info, trace};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_long, c_uchar, c_uint, c_ulong};
use std::ptr;
use x11::xlib;

use super::{parse_class_list, WindowContext, WindowId, WindowSource};
use crate::error::RemapError;

/// `None` focus value
const FOCUS_NONE: xlib::Window = 0;
/// `PointerRoot` focus value
const FOCUS_POINTER_ROOT: xlib::Window = 1;

/// Property read length, in 32-bit units
const PROPERTY_LENGTH: c_long = 1024;

/// Log X protocol errors instead of exiting (Xlib's default handler exits)
unsafe extern "C" fn handle_x_error(display: *mut xlib::Display, event: *mut xlib::XErrorEvent) -> c_int {
    let mut buf = [0 as c_char; 1024];
    // SAFETY: Xlib passes a valid display and event to the handler.
    let code = (*event).error_code as c_int;
    xlib::XGetErrorText(display, code, buf.as_mut_ptr(), buf.len() as c_int);
    let text = CStr::from_ptr(buf.as_ptr()).to_string_lossy();
    error!("x11: {}", text);
    0
}

/// Xlib-backed window source
pub struct XlibWindows {
    display: *mut xlib::Display,
    wm_class: xlib::Atom,
    net_wm_name: xlib::Atom,
    utf8_string: xlib::Atom,
}

impl XlibWindows {
    /// Connect to the display named by `$DISPLAY`
    pub fn open() -> Result<Self> {
        // SAFETY: installing a handler has no preconditions.
        unsafe { xlib::XSetErrorHandler(Some(handle_x_error)) };

        let display = open_display()?;
        // SAFETY: `display` is a valid connection.
        let (wm_class, net_wm_name, utf8_string) = unsafe {
            (
                intern(display, "WM_CLASS")?,
                intern(display, "_NET_WM_NAME")?,
                intern(display, "UTF8_STRING")?,
            )
        };
        info!("X display connected");
        Ok(Self {
            display,
            wm_class,
            net_wm_name,
            utf8_string,
        })
    }

    fn atom_name(&self, atom: xlib::Atom) -> String {
        if atom == 0 {
            return "None".to_string();
        }
        // SAFETY: display is valid; the returned string is owned by us.
        unsafe {
            let name = xlib::XGetAtomName(self.display, atom);
            if name.is_null() {
                return format!("atom {}", atom);
            }
            let text = CStr::from_ptr(name).to_string_lossy().into_owned();
            xlib::XFree(name as *mut _);
            text
        }
    }

    /// Read an 8-bit property of type `expected`
    ///
    /// Ok(None) when the window does not carry the property.
    fn read_property(
        &self,
        window: xlib::Window,
        property: xlib::Atom,
        expected: xlib::Atom,
    ) -> Result<Option<Vec<u8>>> {
        let mut actual_type: xlib::Atom = 0;
        let mut format: c_int = 0;
        let mut nitems: c_ulong = 0;
        let mut remaining: c_ulong = 0;
        let mut data: *mut c_uchar = ptr::null_mut();

        // SAFETY: all out-pointers are valid for the duration of the call.
        let res = unsafe {
            xlib::XGetWindowProperty(
                self.display,
                window,
                property,
                0,
                PROPERTY_LENGTH,
                xlib::False,
                expected,
                &mut actual_type,
                &mut format,
                &mut nitems,
                &mut remaining,
                &mut data,
            )
        };
        if res != xlib::Success as c_int {
            return Err(anyhow!(
                "XGetWindowProperty({}) failed: {}",
                self.atom_name(property),
                res
            ));
        }

        let bytes = if data.is_null() {
            Vec::new()
        } else {
            // SAFETY: Xlib returns `nitems` format-8 items at `data`.
            let v = unsafe { std::slice::from_raw_parts(data, nitems as usize) }.to_vec();
            unsafe { xlib::XFree(data as *mut _) };
            v
        };

        if actual_type == 0 {
            trace!("{} not set on window {}", self.atom_name(property), window);
            return Ok(None);
        }
        if actual_type != expected {
            return Err(RemapError::UnexpectedPropertyType {
                property: self.atom_name(property),
                found: self.atom_name(actual_type),
            }
            .into());
        }
        if format != 8 {
            return Err(RemapError::UnexpectedPropertyFormat {
                property: self.atom_name(property),
                format,
            }
            .into());
        }
        Ok(Some(bytes))
    }
}

impl WindowSource for XlibWindows {
    fn focused_window(&mut self) -> Result<WindowId> {
        let mut window: xlib::Window = 0;
        let mut revert: c_int = 0;
        // SAFETY: display is valid; out-pointers are live locals.
        let res = unsafe { xlib::XGetInputFocus(self.display, &mut window, &mut revert) };
        if res != 1 {
            return Err(anyhow!("XGetInputFocus failed: {}", res));
        }
        match window {
            FOCUS_NONE => Err(RemapError::NoFocus.into()),
            // SAFETY: display is valid.
            FOCUS_POINTER_ROOT => Ok(unsafe { xlib::XDefaultRootWindow(self.display) } as WindowId),
            w => Ok(w as WindowId),
        }
    }

    fn window_context(&mut self, window: WindowId) -> Result<WindowContext> {
        let w = window as xlib::Window;
        let class = self
            .read_property(w, self.wm_class, xlib::XA_STRING)?
            .map(|bytes| parse_class_list(&bytes))
            .unwrap_or_default();
        let name = self
            .read_property(w, self.net_wm_name, self.utf8_string)?
            .map(|bytes| {
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                String::from_utf8_lossy(&bytes[..end]).into_owned()
            })
            .unwrap_or_default();
        trace!("window {}: class={:?} name={:?}", window, class, name);
        Ok(WindowContext { window, class, name })
    }

    fn parent(&mut self, window: WindowId) -> Result<Option<WindowId>> {
        let mut root: xlib::Window = 0;
        let mut parent: xlib::Window = 0;
        let mut children: *mut xlib::Window = ptr::null_mut();
        let mut count: c_uint = 0;
        // SAFETY: display is valid; out-pointers are live locals.
        let status = unsafe {
            xlib::XQueryTree(
                self.display,
                window as xlib::Window,
                &mut root,
                &mut parent,
                &mut children,
                &mut count,
            )
        };
        if !children.is_null() {
            unsafe { xlib::XFree(children as *mut _) };
        }
        if status == 0 {
            return Err(anyhow!("XQueryTree failed for window {}", window));
        }
        if window as xlib::Window == root || parent == 0 {
            Ok(None)
        } else {
            Ok(Some(parent as WindowId))
        }
    }

    fn reconnect(&mut self) -> Result<()> {
        // The old connection belongs to the parent process: drop the
        // pointer without XCloseDisplay so no request goes out on it.
        self.display = open_display()?;
        Ok(())
    }
}

impl Drop for XlibWindows {
    fn drop(&mut self) {
        // SAFETY: display was opened by XOpenDisplay and is not used after this.
        unsafe { xlib::XCloseDisplay(self.display) };
    }
}

fn open_display() -> Result<*mut xlib::Display> {
    // SAFETY: null selects $DISPLAY.
    let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
    if display.is_null() {
        let name = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
        error!("XOpenDisplay failed; DISPLAY={}", name);
        return Err(RemapError::DisplayUnavailable.into());
    }
    Ok(display)
}

/// Intern `name` on `display`
///
/// # Safety
/// `display` must be a valid connection.
unsafe fn intern(display: *mut xlib::Display, name: &str) -> Result<xlib::Atom> {
    let cname = CString::new(name)?;
    let atom = xlib::XInternAtom(display, cname.as_ptr(), xlib::False);
    if atom == 0 {
        return Err(anyhow!("XInternAtom({}) failed", name));
    }
    Ok(atom)
}
