//! `rekoda setup`: resolve interpreter → create venv → install packages → settings.
//!
//! Flow:
//!   1. Find python3, or a python that reports 3.x (exit 1 if neither)
//!   2. `python -m venv ./venv` (exit 1 if the directory is missing afterwards)
//!   3. `pip install --upgrade` the fixed package set inside the activated venv
//!   4. Run the settings script; its status is reported, the process still exits 0

use std::path::{Path, PathBuf};

use crate::delegate::{self, DelegateOutcome};
use crate::env::builder::{self, ActivatedEnv, InstallOutcome};
use crate::error::BootstrapError;
use crate::runtime_resolver::{
    resolve_interpreter, InterpreterCandidates, ResolvedInterpreter, SystemProbe, VersionProbe,
};
use crate::{info_log, step};

/// Everything the pipeline needs to know, fixed up front.
#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    pub work_dir: PathBuf,
    pub candidates: InterpreterCandidates,
    pub packages: &'static [&'static str],
    pub settings_script: String,
}

impl BootstrapPlan {
    /// The standard plan rooted at `work_dir`.
    pub fn for_dir(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            candidates: InterpreterCandidates::default(),
            packages: builder::REQUIRED_PACKAGES,
            settings_script: delegate::SETTINGS_SCRIPT.to_string(),
        }
    }

    pub fn env_dir(&self) -> PathBuf {
        builder::venv_dir(&self.work_dir)
    }
}

/// What a pipeline run that got past both gates did.
#[derive(Debug)]
pub struct BootstrapReport {
    pub interpreter: ResolvedInterpreter,
    pub env_dir: PathBuf,
    pub install: InstallOutcome,
    pub delegate: DelegateOutcome,
}

/// Run the pipeline. Only the two gates return `Err`.
pub fn run<P: VersionProbe + ?Sized>(
    plan: &BootstrapPlan,
    probe: &P,
) -> Result<BootstrapReport, BootstrapError> {
    step!("🔍 Step 1/4: Looking for a Python 3 interpreter...");
    let interpreter = resolve_interpreter(probe, &plan.candidates)?;
    step!(
        "✅ Step 1/4: Using {} ({})",
        interpreter.program.display(),
        interpreter.version
    );

    let env_dir = plan.env_dir();
    step!("📦 Step 2/4: Creating virtual environment at {}", env_dir.display());
    builder::create_venv(&interpreter, &env_dir, &plan.work_dir)?;
    step!("✅ Step 2/4: Virtual environment ready");

    step!("⬇  Step 3/4: Installing {}", plan.packages.join(" "));
    let install = install_in_env(&env_dir, plan);
    match &install {
        InstallOutcome::Installed => step!("✅ Step 3/4: Packages installed"),
        InstallOutcome::Failed(status) => {
            tracing::warn!(status = %status, "package install failed");
            step!("⚠ Step 3/4: Package install exited with {}", status);
        }
        InstallOutcome::NotStarted(e) => {
            tracing::warn!(error = %e, "package installer could not be started");
            step!("⚠ Step 3/4: Package installer could not be started: {}", e);
        }
    }

    step!("⚙  Step 4/4: Running {}", plan.settings_script);
    let delegate = delegate::run_settings_script(&plan.work_dir, &plan.settings_script);
    match &delegate {
        DelegateOutcome::Exited(status) if status.success() => {
            info_log!("settings script finished");
        }
        DelegateOutcome::Exited(status) => {
            tracing::warn!(script = %plan.settings_script, status = %status, "settings script exited unsuccessfully");
        }
        DelegateOutcome::NotStarted(e) => {
            tracing::warn!(script = %plan.settings_script, error = %e, "settings script could not be started");
        }
    }
    step!("✅ Setup complete");

    Ok(BootstrapReport {
        interpreter,
        env_dir,
        install,
        delegate,
    })
}

/// Activation is scoped to the install call and dropped right after it.
fn install_in_env(env_dir: &Path, plan: &BootstrapPlan) -> InstallOutcome {
    let activated = match ActivatedEnv::activate(env_dir) {
        Ok(a) => a,
        Err(e) => {
            return InstallOutcome::NotStarted(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{:#}", e),
            ))
        }
    };
    builder::install_packages(&activated, plan.packages, &plan.work_dir)
}

/// Entry point for `rekoda-setup` / `rekoda setup`; returns the process exit code.
pub fn run_setup(work_dir: &Path) -> i32 {
    let plan = BootstrapPlan::for_dir(work_dir);
    match run(&plan, &SystemProbe) {
        Ok(_) => 0,
        Err(e) => {
            tracing::error!(error = %e, "setup aborted");
            eprintln!("❌ {}", e);
            e.exit_code()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;

    // Writing an executable while another test thread forks can fail with
    // ETXTBSY, so tests that create and run scripts take turns.
    static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

    fn write_script(path: &Path, body: &str) {
        fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// A python3 stand-in that answers `--version` and builds a fake venv whose
    /// pip records its arguments and VIRTUAL_ENV, then exits with `pip_status`.
    fn fake_python(dir: &Path, name: &str, version: &str, pip_status: i32) -> String {
        let path = dir.join(name);
        let body = format!(
            r#"if [ "$1" = "--version" ]; then echo "{version}"; exit 0; fi
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin"
  printf '#!/bin/sh\necho "$@" > "$VIRTUAL_ENV/pip-args.txt"\necho "$VIRTUAL_ENV" > "$VIRTUAL_ENV/pip-venv.txt"\nexit {pip_status}\n' > "$3/bin/pip"
  chmod +x "$3/bin/pip"
  exit 0
fi
exit 1
"#
        );
        write_script(&path, &body);
        path.to_string_lossy().into_owned()
    }

    fn plan_for(work_dir: &Path, primary: String, fallback: String) -> BootstrapPlan {
        BootstrapPlan {
            candidates: InterpreterCandidates { primary, fallback },
            ..BootstrapPlan::for_dir(work_dir)
        }
    }

    #[test]
    fn test_full_pipeline_installs_fixed_packages_and_runs_settings() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let python3 = fake_python(tools.path(), "python3", "Python 3.12.1", 0);
        write_script(
            &tmp.path().join("settings.sh"),
            "echo ran > settings-ran.txt\nexit 0\n",
        );

        let plan = plan_for(tmp.path(), python3, "/nonexistent/python".to_string());
        let report = run(&plan, &SystemProbe).unwrap();

        let env_dir = tmp.path().join("venv");
        assert!(env_dir.is_dir());
        assert_eq!(report.env_dir, env_dir);
        assert!(report.install.is_success());
        assert!(report.delegate.is_success());

        let args = fs::read_to_string(env_dir.join("pip-args.txt")).unwrap();
        assert_eq!(
            args.trim(),
            "install --upgrade streamlink aiohttp aiofiles orjson uvloop"
        );
        let venv_var = fs::read_to_string(env_dir.join("pip-venv.txt")).unwrap();
        assert_eq!(Path::new(venv_var.trim()), env_dir);
        assert!(tmp.path().join("settings-ran.txt").exists());
    }

    #[test]
    fn test_failures_after_the_gates_are_swallowed() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let python3 = fake_python(tools.path(), "python3", "Python 3.10.0", 2);
        write_script(&tmp.path().join("settings.sh"), "exit 7\n");

        let plan = plan_for(tmp.path(), python3, "/nonexistent/python".to_string());
        let report = run(&plan, &SystemProbe).unwrap();

        assert!(matches!(report.install, InstallOutcome::Failed(s) if s.code() == Some(2)));
        assert!(matches!(report.delegate, DelegateOutcome::Exited(s) if s.code() == Some(7)));
    }

    #[test]
    fn test_no_interpreter_exits_1_without_creating_env() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = plan_for(
            tmp.path(),
            "/nonexistent/python3".to_string(),
            "/nonexistent/python".to_string(),
        );
        let err = run(&plan, &SystemProbe).unwrap_err();
        assert!(matches!(err, BootstrapError::InterpreterNotFound { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(!tmp.path().join("venv").exists());
    }

    #[test]
    fn test_python2_fallback_is_rejected() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let python = tools.path().join("python");
        write_script(&python, "echo 'Python 2.7.18' >&2\nexit 0\n");

        let plan = plan_for(
            tmp.path(),
            "/nonexistent/python3".to_string(),
            python.to_string_lossy().into_owned(),
        );
        let err = run(&plan, &SystemProbe).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(!tmp.path().join("venv").exists());
    }

    #[test]
    fn test_fallback_python3_is_used() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let python = fake_python(tools.path(), "python", "Python 3.8.10", 0);
        write_script(&tmp.path().join("settings.sh"), "exit 0\n");

        let plan = plan_for(tmp.path(), "/nonexistent/python3".to_string(), python.clone());
        let report = run(&plan, &SystemProbe).unwrap();
        assert_eq!(report.interpreter.program, PathBuf::from(python));
        assert!(tmp.path().join("venv").is_dir());
    }

    #[test]
    fn test_venv_that_never_appears_exits_1() {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let python3 = tools.path().join("python3");
        // answers --version but "creates" nothing
        write_script(
            &python3,
            "if [ \"$1\" = \"--version\" ]; then echo 'Python 3.11.0'; fi\nexit 0\n",
        );
        write_script(
            &tmp.path().join("settings.sh"),
            "echo ran > settings-ran.txt\n",
        );

        let plan = plan_for(
            tmp.path(),
            python3.to_string_lossy().into_owned(),
            "/nonexistent/python".to_string(),
        );
        let err = run(&plan, &SystemProbe).unwrap_err();
        assert!(matches!(err, BootstrapError::EnvironmentMissing(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(!tmp.path().join("settings-ran.txt").exists());
    }
}
