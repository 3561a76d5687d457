//! Command helper methods for Test.

use std::process::Output;

use assert_cmd::Command;

use super::Test;

impl Test {
    /// An `sc` command running inside the test repository.
    ///
    /// HOME points at the temporary home, colors and env-based logging are
    /// disabled so output is stable.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("sc").expect("failed to find sc binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("SC_LOG");
        cmd.env_remove("SC_PROFILE");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run `sc` with arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("failed to run sc")
    }

    /// `sc init` with extra arguments.
    pub fn init_cmd(&self, extra: &[&str]) -> Output {
        let mut args = vec!["init"];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    /// `sc secrets <args>`.
    pub fn secrets(&self, args: &[&str]) -> Output {
        let mut all = vec!["secrets"];
        all.extend_from_slice(args);
        self.run(&all)
    }

    /// `sc stack <args>`.
    pub fn stack(&self, args: &[&str]) -> Output {
        let mut all = vec!["stack"];
        all.extend_from_slice(args);
        self.run(&all)
    }
}
