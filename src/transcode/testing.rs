use crate::prelude::*;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records the arguments of every call instead of running ffmpeg
#[derive(Debug)]
pub(crate) struct MockFfmpeg {
    /// Names of the input files the conversion of which fails
    failing_inputs: Vec<String>,
    args_log: Mutex<Vec<Vec<String>>>,
}

impl MockFfmpeg {
    pub(crate) fn new(failing_inputs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing_inputs: failing_inputs.iter().map(|&input| input.to_owned()).collect(),
            args_log: Mutex::default(),
        })
    }

    /// Calls sorted by their arguments, because files are converted concurrently
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        let mut calls = self.args_log.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

#[async_trait]
impl crate::ffmpeg::Ffmpeg for MockFfmpeg {
    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>> {
        let input_pos = args.iter().position(|arg| arg == "-i").unwrap();
        let input = Utf8Path::new(&args[input_pos + 1]).file_name().unwrap().to_owned();

        self.args_log.lock().unwrap().push(args);

        if self.failing_inputs.contains(&input) {
            bail!("ffmpeg failed for {input}");
        }

        Ok(b"webm".to_vec())
    }

    async fn run_with_output_file(
        &self,
        args: Vec<String>,
        output_file: &Utf8Path,
    ) -> Result<Vec<u8>> {
        let mut args = args;
        args.push(output_file.to_string());
        self.run(args).await
    }
}
