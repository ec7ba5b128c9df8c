#[cfg(test)]
pub mod fixtures {
    use crate::config::DetectConfig;

    /// Configuration that passes validation with every optional stage off.
    pub fn valid_config() -> DetectConfig {
        DetectConfig {
            server_url: "https://blackduck.example.com".to_string(),
            token: "secret-token".to_string(),
            project_name: "shop".to_string(),
            version: "1.4.2".to_string(),
            versioning_model: "major".to_string(),
            ..DetectConfig::default()
        }
    }
}

#[cfg(test)]
pub mod fakes {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::fs;
    use std::io;
    use std::path::Path;

    use crate::exec::{CommandRunner, Invocation, ProcessOutput};
    use crate::prepare::{
        BuildError, BuildTools, ImageSaveOptions, MavenBuildOptions, MavenInstallOptions,
        MtaBuildOptions, NpmInstallOptions,
    };
    use crate::script::{AcquireError, ScriptFetcher};

    /// Canned result for one [`RecordingRunner`] call.
    #[derive(Debug, Clone)]
    pub enum ScriptedResult {
        Exit { code: i32, output: String },
        SpawnError,
    }

    impl ScriptedResult {
        pub fn exit(code: i32, output: &str) -> Self {
            Self::Exit {
                code,
                output: output.to_string(),
            }
        }
    }

    /// Runner that records invocations and replays scripted results.
    /// Calls beyond the script succeed with empty output.
    #[derive(Default)]
    pub struct RecordingRunner {
        script: RefCell<VecDeque<ScriptedResult>>,
        invocations: RefCell<Vec<Invocation>>,
        check_program: bool,
        program_existed: RefCell<Vec<bool>>,
    }

    impl RecordingRunner {
        pub fn succeeding() -> Self {
            Self::default()
        }

        pub fn scripted(results: Vec<ScriptedResult>) -> Self {
            Self {
                script: RefCell::new(results.into()),
                ..Self::default()
            }
        }

        pub fn with_exit_codes(codes: Vec<i32>) -> Self {
            Self::scripted(
                codes
                    .into_iter()
                    .map(|code| ScriptedResult::exit(code, ""))
                    .collect(),
            )
        }

        /// Record whether the program file exists at each call.
        pub fn checking_program_exists(mut self) -> Self {
            self.check_program = true;
            self
        }

        pub fn invocations(&self) -> Vec<Invocation> {
            self.invocations.borrow().clone()
        }

        pub fn program_existed(&self) -> Vec<bool> {
            self.program_existed.borrow().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
            self.invocations.borrow_mut().push(invocation.clone());
            if self.check_program {
                self.program_existed
                    .borrow_mut()
                    .push(invocation.program.exists());
            }

            match self.script.borrow_mut().pop_front() {
                None => Ok(ProcessOutput {
                    exit_code: Some(0),
                    output: String::new(),
                }),
                Some(ScriptedResult::Exit { code, output }) => Ok(ProcessOutput {
                    exit_code: Some(code),
                    output,
                }),
                Some(ScriptedResult::SpawnError) => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no such program",
                )),
            }
        }
    }

    /// Build tools that only count calls, optionally failing one stage.
    #[derive(Default)]
    pub struct CountingTools {
        log: RefCell<Vec<&'static str>>,
        fail_at: Option<&'static str>,
        npm_descriptors: RefCell<Vec<String>>,
    }

    impl CountingTools {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_at(mut self, stage: &'static str) -> Self {
            self.fail_at = Some(stage);
            self
        }

        /// The error a failing stage reports.
        pub fn failure_for(stage: &'static str) -> BuildError {
            BuildError::Failed {
                stage,
                program: "fake".to_string(),
                status: "exit status 1".to_string(),
            }
        }

        pub fn call_log(&self) -> Vec<&'static str> {
            self.log.borrow().clone()
        }

        pub fn total_calls(&self) -> usize {
            self.log.borrow().len()
        }

        pub fn calls(&self, stage: &str) -> usize {
            self.log.borrow().iter().filter(|s| **s == stage).count()
        }

        pub fn npm_descriptors(&self) -> Vec<String> {
            self.npm_descriptors.borrow().clone()
        }

        fn record(&self, stage: &'static str) -> Result<(), BuildError> {
            self.log.borrow_mut().push(stage);
            if self.fail_at == Some(stage) {
                return Err(Self::failure_for(stage));
            }
            Ok(())
        }
    }

    impl BuildTools for CountingTools {
        fn install_maven_artifacts(
            &self,
            _options: &MavenInstallOptions,
        ) -> Result<(), BuildError> {
            self.record("install-artifacts")
        }

        fn run_maven_build(&self, _options: &MavenBuildOptions) -> Result<(), BuildError> {
            self.record("maven-build")
        }

        fn install_npm_dependencies(&self, options: &NpmInstallOptions) -> Result<(), BuildError> {
            self.npm_descriptors
                .borrow_mut()
                .extend(options.descriptors.iter().cloned());
            self.record("npm-install")
        }

        fn run_mta_build(&self, _options: &MtaBuildOptions) -> Result<(), BuildError> {
            self.record("mta-build")
        }

        fn save_container_image(&self, options: &ImageSaveOptions) -> Result<(), BuildError> {
            let _ = fs::write(&options.tar_path, "tarball");
            self.record("save-image")
        }
    }

    /// Fetcher writing fixed content, or failing after a partial write.
    pub struct StaticFetcher {
        content: Option<String>,
        fetches: Cell<usize>,
    }

    impl StaticFetcher {
        pub fn new(content: &str) -> Self {
            Self {
                content: Some(content.to_string()),
                fetches: Cell::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                content: None,
                fetches: Cell::new(0),
            }
        }

        pub fn fetches(&self) -> usize {
            self.fetches.get()
        }
    }

    impl ScriptFetcher for StaticFetcher {
        fn fetch(&self, source: &str, target: &Path) -> Result<(), AcquireError> {
            self.fetches.set(self.fetches.get() + 1);
            match &self.content {
                Some(content) => fs::write(target, content)
                    .map_err(|e| AcquireError::io(target, crate::error::IoOperation::Write, e)),
                None => {
                    let _ = fs::write(target, "partial");
                    Err(AcquireError::Http {
                        url: source.to_string(),
                        status: 503,
                    })
                }
            }
        }
    }
}
