use crate::srt::Cue;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

/// Writes the cues to `output`, replacing any existing file.
///
/// The document is rendered in memory and written to a temporary file next to
/// `output` first, so a failed conversion never leaves a truncated file behind.
/// A symlinked `output` is resolved so the file it points at gets replaced.
pub fn serialise<P: AsRef<Path>>(cues: &[Cue], output: P) -> Result<()> {
    let document = render(cues)?;

    let (output, permissions) = match std::fs::metadata(output.as_ref()) {
        Ok(meta) => {
            if meta.permissions().readonly() {
                bail!("Output file is read-only.");
            }
            let resolved = std::fs::canonicalize(output.as_ref())
                .context("Failed to resolve output file.")?;
            (resolved, Some(meta.permissions()))
        }
        Err(_) => (output.as_ref().to_path_buf(), None),
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).context("Failed to create temporary file!")?;
    file.write_all(&document)
        .context("Failed to write to output file.")?;
    if let Some(permissions) = permissions {
        std::fs::set_permissions(file.path(), permissions)
            .context("Failed to copy permissions of the existing output file.")?;
    }
    file.persist(&output)
        .context("Failed to replace output file.")?;
    Ok(())
}

pub fn render(cues: &[Cue]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_cues(&mut buf, cues)?;
    Ok(buf)
}

pub fn write_cues<W: Write>(buf: &mut W, cues: &[Cue]) -> Result<()> {
    for cue in cues {
        write_cue(buf, cue)?;
    }
    Ok(())
}

fn write_cue<W: Write>(buf: &mut W, cue: &Cue) -> Result<()> {
    writeln!(buf, "{}", cue.sequence_number)?;
    write_ts(buf, cue.show_at)?;
    write!(buf, " --> ")?;
    write_ts(buf, cue.hide_at)?;
    writeln!(buf)?;
    writeln!(buf, "{}", cue.text)?;
    writeln!(buf)?;
    Ok(())
}

fn write_ts<W: Write>(buf: &mut W, timestamp: Duration) -> Result<()> {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.subsec_millis();
    write!(
        buf,
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    macro_rules! test_write_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let ts = Duration::from_secs(input);
                let mut buf = Cursor::new(vec![]);

                write_ts(&mut buf, ts).expect("Failed to write to buffer");

                assert_eq!(String::from_utf8(buf.into_inner()).unwrap(), expected);
            }
        )*
        }
    }

    test_write_ts! {
        test_write_ts_0: (0, "00:00:00,000"),
        test_write_ts_1: (1, "00:00:01,000"),
        test_write_ts_2: (59, "00:00:59,000"),
        test_write_ts_3: (60, "00:01:00,000"),
        test_write_ts_4: (754, "00:12:34,000"),
        test_write_ts_5: (3599, "00:59:59,000"),
        test_write_ts_6: (3600, "01:00:00,000"),
        test_write_ts_7: (3910, "01:05:10,000"),
        test_write_ts_8: (3915, "01:05:15,000"),
        test_write_ts_9: (34_380, "09:33:00,000"),
        test_write_ts_10: (360_000, "100:00:00,000"),
    }

    fn cue(seqnum: usize, show_at: u64, hide_at: u64, text: &str) -> Cue {
        Cue {
            sequence_number: seqnum,
            show_at: Duration::from_secs(show_at),
            hide_at: Duration::from_secs(hide_at),
            text: text.to_string(),
        }
    }

    #[test]
    fn renders_cues_separated_by_blank_lines() {
        let cues = vec![cue(1, 0, 5, "Hello world"), cue(2, 5, 7, "Second line")];
        let document = String::from_utf8(render(&cues).unwrap()).unwrap();
        assert_eq!(
            document,
            "1\n00:00:00,000 --> 00:00:05,000\nHello world\n\n\
             2\n00:00:05,000 --> 00:00:07,000\nSecond line\n\n"
        );
    }

    #[test]
    fn renders_nothing_for_no_cues() {
        assert!(render(&[]).unwrap().is_empty());
    }

    #[test]
    fn serialise_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.srt");
        std::fs::write(&path, "stale contents that are much longer than the new ones").unwrap();

        serialise(&[cue(1, 3910, 3915, "Long show")], &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1\n01:05:10,000 --> 01:05:15,000\nLong show\n\n"
        );
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn serialise_writes_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.srt");
        let link = dir.path().join("link.srt");
        std::fs::write(&target, "old").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        serialise(&[cue(1, 0, 2, "through the link")], &link).unwrap();

        let link_meta = std::fs::symlink_metadata(&link).unwrap();
        assert!(link_meta.file_type().is_symlink());
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "1\n00:00:00,000 --> 00:00:02,000\nthrough the link\n\n"
        );
    }

    #[test]
    fn serialise_refuses_read_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.srt");
        std::fs::write(&path, "keep me").unwrap();
        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&path, permissions).unwrap();

        assert!(serialise(&[cue(1, 0, 2, "x")], &path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn serialise_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.srt");
        assert!(serialise(&[cue(1, 0, 2, "x")], &path).is_err());
        assert!(!path.exists());
    }
}
