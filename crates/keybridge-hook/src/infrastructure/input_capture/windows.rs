//! Windows low-level keyboard and mouse hook implementation.
//!
//! This module installs WH_KEYBOARD_LL and WH_MOUSE_LL hooks using the
//! Windows API.  Both hooks are installed from the thread that runs
//! [`HookHost::run_message_loop`]; Windows delivers low-level hook callbacks
//! to the installing thread, and only while that thread is waiting inside
//! `GetMessageW`.
//!
//! # Reaching the mailbox from the callback
//!
//! Hook procedures are bare `extern "system"` functions with no user data
//! pointer.  Because the callbacks always run on the installing thread, the
//! mailbox is parked in a thread-local on that thread rather than in a
//! process-wide static.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use keybridge_core::EventMailbox;
use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK,
    KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE, WH_KEYBOARD_LL, WH_MOUSE_LL, WM_QUIT,
};

use super::translate::{translate_keyboard, translate_mouse};
use crate::application::bridge::{CaptureError, HookHandle, HookHost, HookKind};

thread_local! {
    /// Mailbox for the keyboard hook installed on this thread.
    static KEYBOARD_MAILBOX: RefCell<Option<Arc<EventMailbox>>> = const { RefCell::new(None) };
    /// Mailbox for the mouse hook installed on this thread.
    static MOUSE_MAILBOX: RefCell<Option<Arc<EventMailbox>>> = const { RefCell::new(None) };
}

/// Windows low-level hook host.
pub struct WindowsHookHost {
    /// Thread id of the pump thread; 0 until the first `install`.
    pump_thread: AtomicU32,
    /// Set by `quit_message_loop`; checked before the loop is entered.
    quit_requested: AtomicBool,
}

impl WindowsHookHost {
    /// Creates a new host with no hooks installed.
    pub fn new() -> Self {
        Self {
            pump_thread: AtomicU32::new(0),
            quit_requested: AtomicBool::new(false),
        }
    }

    fn is_pump_thread(&self) -> bool {
        // SAFETY: GetCurrentThreadId has no preconditions.
        let current = unsafe { GetCurrentThreadId() };
        self.pump_thread.load(Ordering::SeqCst) == current
    }
}

impl Default for WindowsHookHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HookHost for WindowsHookHost {
    fn install(
        &self,
        kind: HookKind,
        mailbox: Arc<EventMailbox>,
    ) -> Result<HookHandle, CaptureError> {
        // SAFETY: GetCurrentThreadId has no preconditions.
        let thread_id = unsafe { GetCurrentThreadId() };
        self.pump_thread.store(thread_id, Ordering::SeqCst);

        // Force creation of this thread's message queue so that a WM_QUIT
        // posted before the loop starts is not dropped.
        let mut msg = MSG::default();
        // SAFETY: msg is a valid, writable MSG; PM_NOREMOVE leaves the queue untouched.
        unsafe {
            let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
        }

        // Park the mailbox before the hook exists so the first callback finds it.
        let (id, proc_fn, slot): (_, unsafe extern "system" fn(i32, WPARAM, LPARAM) -> LRESULT, _) =
            match kind {
                HookKind::Keyboard => (WH_KEYBOARD_LL, keyboard_hook_proc as _, &KEYBOARD_MAILBOX),
                HookKind::Mouse => (WH_MOUSE_LL, mouse_hook_proc as _, &MOUSE_MAILBOX),
            };
        slot.with(|cell| *cell.borrow_mut() = Some(mailbox));

        // SAFETY: proc_fn is a valid hook procedure for `id`, and this thread
        // runs the message loop that low-level hooks require.
        let hook = unsafe { SetWindowsHookExW(id, Some(proc_fn), None, 0) }.map_err(|e| {
            slot.with(|cell| cell.borrow_mut().take());
            CaptureError::install_failed(kind, e.to_string())
        })?;

        debug!(%kind, thread_id, "SetWindowsHookExW succeeded");
        Ok(HookHandle::from_raw(hook.0 as usize))
    }

    fn uninstall(&self, handle: HookHandle) {
        let hook = HHOOK(handle.into_raw() as *mut c_void);
        // SAFETY: the handle came from SetWindowsHookExW; unhooking a handle
        // that is already gone fails harmlessly.
        if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
            debug!(?handle, error = %e, "UnhookWindowsHookEx failed (already removed?)");
        }
    }

    fn run_message_loop(&self) -> Result<(), CaptureError> {
        let mut result = Ok(());

        if !self.quit_requested.load(Ordering::SeqCst) {
            let mut msg = MSG::default();
            // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
            unsafe {
                loop {
                    match GetMessageW(&mut msg, None, 0, 0).0 {
                        0 => break,
                        -1 => {
                            result = Err(CaptureError::MessageLoop(
                                std::io::Error::last_os_error().to_string(),
                            ));
                            break;
                        }
                        _ => {
                            let _ = TranslateMessage(&msg);
                            DispatchMessageW(&msg);
                        }
                    }
                }
            }
        }

        if self.is_pump_thread() {
            KEYBOARD_MAILBOX.with(|cell| cell.borrow_mut().take());
            MOUSE_MAILBOX.with(|cell| cell.borrow_mut().take());
        }
        result
    }

    fn quit_message_loop(&self) {
        self.quit_requested.store(true, Ordering::SeqCst);
        let thread_id = self.pump_thread.load(Ordering::SeqCst);
        if thread_id == 0 {
            return;
        }
        // SAFETY: posting a message to a thread id has no memory-safety preconditions.
        if let Err(e) = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
            warn!(thread_id, error = %e, "failed to post WM_QUIT to the pump thread");
        }
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// This function is called by Windows from the hook message loop thread.
/// It must return quickly (< ~300ms) to avoid hook removal by the OS.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        if let Some(event) = translate_keyboard(w_param.0 as u32, kbs.vkCode) {
            KEYBOARD_MAILBOX.with(|cell| {
                if let Some(mailbox) = cell.borrow().as_ref() {
                    mailbox.deposit(event);
                }
            });
        }
    }

    // SAFETY: Always forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        if let Some(event) = translate_mouse(w_param.0 as u32) {
            MOUSE_MAILBOX.with(|cell| {
                if let Some(mailbox) = cell.borrow().as_ref() {
                    mailbox.deposit(event);
                }
            });
        }
    }

    // SAFETY: Always forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
