pub mod chrome;

use crate::Result;

pub use chrome::ChromeSession;

/// A rendered page that can be captured repeatedly.
pub trait BrowserSession {
    /// Capture the current viewport as PNG bytes.
    fn capture(&mut self) -> Result<Vec<u8>>;

    /// Release the browser. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}
