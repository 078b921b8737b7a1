use trebuchet::error::DeployError;

#[test]
fn display_invalid_input() {
    let err = DeployError::InvalidInput("port must be numeric, got 'abc'".into());
    assert_eq!(err.to_string(), "invalid input: port must be numeric, got 'abc'");
}

#[test]
fn display_source() {
    let err = DeployError::Source("git clone failed".into());
    assert_eq!(err.to_string(), "source acquisition failed: git clone failed");
}

#[test]
fn display_connectivity() {
    let err = DeployError::Connectivity("cannot reach deploy@203.0.113.9".into());
    assert_eq!(
        err.to_string(),
        "SSH connection failed: cannot reach deploy@203.0.113.9"
    );
}

#[test]
fn display_start_timeout() {
    let err = DeployError::StartTimeout("my-app".into(), 30);
    assert_eq!(
        err.to_string(),
        "container 'my-app' did not start after 30 attempts"
    );
}

#[test]
fn display_command_not_found() {
    let err = DeployError::CommandNotFound("rsync".into());
    assert_eq!(err.to_string(), "command not found: rsync");
}

#[test]
fn from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err: DeployError = io_err.into();
    assert!(matches!(err, DeployError::Io(_)));
    assert_eq!(err.exit_code(), 7);
}

#[test]
fn from_json_error() {
    let json_err = serde_json::from_str::<Vec<u64>>("invalid").unwrap_err();
    let err: DeployError = json_err.into();
    assert!(matches!(err, DeployError::Json(_)));
}

#[test]
fn exit_codes_are_stage_specific() {
    assert_eq!(DeployError::InvalidInput("x".into()).exit_code(), 2);
    assert_eq!(DeployError::Source("x".into()).exit_code(), 3);
    assert_eq!(DeployError::Connectivity("x".into()).exit_code(), 4);
    assert_eq!(DeployError::Provision("x".into()).exit_code(), 5);
    assert_eq!(DeployError::Runtime("x".into()).exit_code(), 5);
    assert_eq!(DeployError::StartTimeout("x".into(), 30).exit_code(), 5);
    assert_eq!(DeployError::Proxy("x".into()).exit_code(), 6);
    assert_eq!(DeployError::Validation("x".into()).exit_code(), 7);
    assert_eq!(DeployError::CommandNotFound("x".into()).exit_code(), 7);
}
