//! Side effects of the browsing context that runs an export.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{error, info};

/// The environment an export talks to: file downloads, new windows, alerts,
/// the print dialog and timers.
pub trait Host {
    /// Saves `bytes` as a downloaded file named `file_name`.
    fn save_file(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Opens a new browsing context showing `document`.
    ///
    /// Returns `false` when the window could not be opened, for example when
    /// a popup blocker refused it.
    fn open_window(&mut self, document: &str) -> bool;

    /// Shows a blocking message to the user.
    fn alert(&mut self, message: &str);

    /// Opens the print dialog of the current page.
    fn print(&mut self);

    /// Suspends the export for `delay`.
    fn wait(&mut self, delay: Duration);
}

/// Host that materializes every effect in an output directory.
///
/// Saved files keep their names, opened windows are written as
/// `window-<n>.html`. Alerts go to the log and stderr.
#[derive(Debug)]
pub struct FileSystemHost {
    out_dir: PathBuf,
    windows_opened: usize,
    print_requests: usize,
    written: Vec<PathBuf>,
}

impl FileSystemHost {
    /// Creates a host writing into `out_dir`; the directory is created on
    /// first use.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            windows_opened: 0,
            print_requests: 0,
            written: Vec::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Number of print dialogs requested.
    pub fn print_requests(&self) -> usize {
        self.print_requests
    }

    fn write(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(file_name);
        fs::write(&path, bytes)?;
        self.written.push(path.clone());
        Ok(path)
    }
}

impl Host for FileSystemHost {
    fn save_file(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.write(file_name, bytes)?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn open_window(&mut self, document: &str) -> bool {
        let file_name = format!("window-{}.html", self.windows_opened + 1);
        match self.write(&file_name, document.as_bytes()) {
            Ok(path) => {
                self.windows_opened += 1;
                info!("Opened window {}", path.display());
                true
            }
            Err(err) => {
                error!("Could not open window {}: {}", file_name, err);
                false
            }
        }
    }

    fn alert(&mut self, message: &str) {
        error!("{}", message);
        eprintln!("{}", message);
    }

    fn print(&mut self) {
        self.print_requests += 1;
        info!("Print dialog requested");
    }

    fn wait(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rapor-host-{}-{}", name, std::process::id()))
    }

    #[test]
    fn windows_are_numbered_in_open_order() {
        let dir = scratch_dir("windows");
        let mut host = FileSystemHost::new(&dir);

        assert!(host.open_window("<html>1</html>"));
        assert!(host.open_window("<html>2</html>"));

        let second = fs::read_to_string(dir.join("window-2.html")).expect("second window");
        assert_eq!(second, "<html>2</html>");
        assert_eq!(host.written().len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn saved_files_keep_their_names() {
        let dir = scratch_dir("save");
        let mut host = FileSystemHost::new(&dir);

        host.save_file("Rapor_Ani.pdf", b"%PDF").expect("save");
        host.print();

        assert_eq!(fs::read(dir.join("Rapor_Ani.pdf")).expect("saved"), b"%PDF");
        assert_eq!(host.print_requests(), 1);

        fs::remove_dir_all(&dir).ok();
    }
}
