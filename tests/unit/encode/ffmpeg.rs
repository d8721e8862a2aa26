use std::io::Write as _;

use super::*;
use crate::foundation::core::Fps;

#[cfg(unix)]
fn shell(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", script]);
    cmd
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(10, 1).unwrap(),
    }
}

#[test]
fn validation_requires_even_non_zero_sizes() {
    assert!(validate(&cfg(0, 10)).is_err());
    assert!(validate(&cfg(11, 10)).is_err());
    assert!(validate(&cfg(10, 10)).is_ok());
}

#[test]
fn arguments_describe_raw_rgba_input() {
    let args = ffmpeg_args(&cfg(120, 100), Path::new("out.mp4"));
    assert_eq!(args[0], "-y");
    let at = |flag: &str| {
        let i = args.iter().position(|a| a == flag).unwrap();
        args[i + 1].clone()
    };
    assert_eq!(at("-s"), "120x100");
    assert_eq!(at("-r"), "10/1");
    assert_eq!(at("-c:v"), "libx264");
    assert_eq!(args.last().unwrap(), "out.mp4");
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new("never.mp4");
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}

#[cfg(unix)]
#[test]
fn verbose_stderr_does_not_block_frame_writes() {
    let mut run = Running::spawn(
        shell("head -c 262144 /dev/zero >&2; cat > /dev/null"),
        cfg(2, 2),
    )
    .unwrap();
    run.stdin
        .as_mut()
        .unwrap()
        .write_all(&vec![0; 262_144])
        .unwrap();
    run.finish().unwrap();
}

#[cfg(unix)]
#[test]
fn failed_encoder_reports_its_stderr() {
    let mut run = Running::spawn(shell("echo bad codec >&2; exit 3"), cfg(2, 2)).unwrap();
    let err = run.finish().unwrap_err().to_string();
    assert!(err.contains("bad codec"), "{err}");
}

#[cfg(unix)]
#[test]
fn abort_kills_and_reaps_a_running_encoder() {
    let mut sleeper = Command::new("sleep");
    sleeper.arg("30");
    let mut run = Running::spawn(sleeper, cfg(2, 2)).unwrap();
    let started = std::time::Instant::now();
    run.abort();
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    let status = run.child.try_wait().unwrap().unwrap();
    assert!(!status.success());
    assert!(run.stdin.is_none());
    assert!(run.stderr.is_none());
}
