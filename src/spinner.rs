//! Animated console spinner
//!
//! Rendered on its own thread so it keeps moving while the main thread
//! blocks on the model. Writes to stderr only; stdout stays clean for the
//! review output itself.

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const FRAME_DURATION: Duration = Duration::from_millis(80);

pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start spinning with `message` next to the animation.
    pub fn start(message: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let _ = execute!(io::stderr(), Hide);
            let mut frame = 0usize;
            while flag.load(Ordering::Relaxed) {
                let _ = execute!(
                    io::stderr(),
                    MoveToColumn(0),
                    Clear(ClearType::CurrentLine),
                    SetForegroundColor(Color::Rgb { r: 140, g: 140, b: 140 }),
                    Print(format!("  {} ", FRAMES[frame % FRAMES.len()])),
                    SetForegroundColor(Color::Rgb { r: 180, g: 180, b: 180 }),
                    Print(&message),
                    ResetColor
                );
                let _ = io::stderr().flush();
                frame += 1;
                std::thread::sleep(FRAME_DURATION);
            }
            let _ = execute!(
                io::stderr(),
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Show
            );
        });

        Self { running, handle: Some(handle) }
    }

    /// Stop the animation and clear the line.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
