#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::ffi::OsStr;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Mutex;

use wayland_color_picker::command::CommandRunner;
use wayland_color_picker::error::CommandError;

/// What a faked tool does when invoked.
pub enum Reply {
    Stdout(&'static str),
    /// Exits non-zero.
    Fail,
    /// Writes the bytes to the last argument (the output path) and exits 0.
    WriteOutput(Vec<u8>),
}

impl Reply {
    pub fn png(width: u32, height: u32, rgb: [u8; 3]) -> Reply {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageOutputFormat::Png)
            .expect("encode png");
        Reply::WriteOutput(bytes.into_inner())
    }

    pub fn garbage() -> Reply {
        Reply::WriteOutput(b"not an image".to_vec())
    }
}

/// Scripted stand-in for the external tools. Replies are consumed per
/// program in order; an exhausted script fails.
#[derive(Default)]
pub struct FakeRunner {
    missing: Vec<String>,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Vec<String>>>,
    outputs: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, program: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn missing(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    /// Every invocation as `[program, args...]`.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call[0].clone()).collect()
    }

    /// Every `.png` path handed to any tool.
    pub fn png_paths(&self) -> Vec<PathBuf> {
        self.outputs.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        if self.missing.iter().any(|m| m == program) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(program))
        }
    }

    fn output(&self, program: &str, args: &[&OsStr]) -> Result<String, CommandError> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        self.calls.lock().unwrap().push(call);

        for arg in args {
            let path = PathBuf::from(arg);
            if path.extension().is_some_and(|ext| ext == "png") {
                self.outputs.lock().unwrap().push(path);
            }
        }

        if self.missing.iter().any(|m| m == program) {
            return Err(CommandError::NotFound {
                program: program.to_string(),
            });
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(program)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::Fail);

        match reply {
            Reply::Stdout(out) => Ok(out.to_string()),
            Reply::Fail => Err(CommandError::Failed {
                program: program.to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("{program}: simulated failure"),
            }),
            Reply::WriteOutput(bytes) => {
                let path = args.last().expect("output path argument");
                std::fs::write(path, bytes).expect("write fake output");
                Ok(String::new())
            }
        }
    }
}
