#![allow(dead_code)]

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{self, Command};

use csvstream::{
    Error, Mode, QuoteStyle, Reader, ReaderBuilder, Record, Writer,
    WriterBuilder,
};

static PEOPLE: &'static str = include_str!("../demos/data/people.csv");

/// Read every record from the given data.
fn read_all(data: &[u8]) -> Vec<Record> {
    let mut rdr = Reader::from_reader(data);
    rdr.records().collect::<Result<_, _>>().unwrap()
}

/// Copy a stream entry by entry.
fn canonicalize(data: &[u8]) -> Vec<u8> {
    let mut rdr = Reader::from_reader(data);
    let mut wtr = Writer::from_writer(vec![]);
    loop {
        let entry = rdr.next_entry().unwrap();
        wtr.append(entry).unwrap();
        if entry.is_end() {
            break;
        }
    }
    wtr.into_inner()
}

fn records(rows: &[&[&str]]) -> Vec<Record> {
    rows.iter().map(|row| Record::from(*row)).collect()
}

#[test]
fn blank_line_only() {
    let mut rdr = Reader::from_reader(&b"\r\n"[..]);
    let entry = rdr.next_entry().unwrap();
    assert_eq!((None, Mode::Field), (entry.contents(), entry.mode()));
    let entry = rdr.next_entry().unwrap();
    assert_eq!((None, Mode::End), (entry.contents(), entry.mode()));
}

#[test]
fn simple_record() {
    assert_eq!(read_all(b"a,b\r\n"), records(&[&["a", "b"]]));
}

#[test]
fn doubled_quote() {
    assert_eq!(read_all(b"\"a\"\"b\"\r\n"), records(&[&["a\"b"]]));
}

#[test]
fn trailing_empty_entry() {
    assert_eq!(read_all(b"a,\r\n"), records(&[&["a", ""]]));
}

#[test]
fn legacy_quote_accepted() {
    assert_eq!(read_all(b"\"a\"b\"\r\n"), records(&[&["a\"b"]]));
}

#[test]
fn unterminated_quote_rejected() {
    let mut rdr = Reader::from_reader(&b"x,\"unterminated extra\r\n"[..]);
    let mut rec = Record::new();
    match rdr.read_record(&mut rec) {
        Err(Error::MalformedQuoting { pos }) => {
            assert_eq!(2, pos.byte());
            assert_eq!(0, pos.record());
            assert_eq!(1, pos.entry());
        }
        got => panic!("unexpected result: {:?}", got),
    }
}

#[test]
fn round_trip_records() {
    let recs = records(&[
        &["plain", "with space", " flanked "],
        &["a,b", "say \"hi\"", "multi\r\nline"],
        &[""],
        &[],
        &["", ""],
        &["\t", "\"", "\u{2603}"],
        &["last"],
    ]);
    for &style in &[QuoteStyle::Necessary, QuoteStyle::Always] {
        let mut wtr = WriterBuilder::new()
            .quote_style(style)
            .from_writer(vec![]);
        for rec in &recs {
            wtr.write_record(rec).unwrap();
        }
        let data = wtr.into_inner();
        assert_eq!(read_all(&data), recs, "{:?}", style);
    }
}

#[test]
fn canonical_form_is_stable() {
    let once = canonicalize(PEOPLE.as_bytes());
    assert_eq!(
        &once[..],
        &b"id,name,note\r\n\
           1,\"Smith, J.\",\"5\"\" tall\"\r\n\
           2,\"Jones \"\"Jo\"\" K.\",\r\n\
           \r\n\
           3,x"[..],
    );
    assert_eq!(once, canonicalize(&once));
}

#[test]
fn small_reads_match_large_reads() {
    let mut big = vec![];
    for i in 0..500 {
        big.extend_from_slice(PEOPLE.as_bytes());
        big.extend_from_slice(format!(",{}\n", i).as_bytes());
    }
    let expected = read_all(&big);
    for &(read_size, threshold) in &[(1, 0), (7, 7), (64, 16), (4096, 1)] {
        let mut rdr = ReaderBuilder::new()
            .read_size(read_size)
            .compact_threshold(threshold)
            .from_reader(&big[..]);
        let got = rdr.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(got, expected, "read size {}", read_size);
    }
}

#[test]
fn csvdump_prints_coordinates() {
    let mut cmd = cmd_for_example("csvdump");
    cmd.arg(data_dir().join("people.csv"));
    let out = cmd_output(&mut cmd);
    assert_eq!(
        out.stdout(),
        "\
(0,0):id
(0,1):name
(0,2):note
(1,0):1
(1,1):Smith, J.
(1,2):5\" tall
(2,0):2
(2,1):Jones \"Jo\" K.
(2,2):
(4,0):3
(4,1):x
<EOF>
"
    );
}

#[test]
fn csvdump_reserializes() {
    let output = env::temp_dir()
        .join(format!("csvdump-reserialized-{}.csv", process::id()));
    let mut flag = std::ffi::OsString::from("-o");
    flag.push(&output);

    let mut cmd = cmd_for_example("csvdump");
    cmd.arg(flag).arg(data_dir().join("people.csv"));
    cmd_output(&mut cmd).stdout();

    let written = fs::read(&output).unwrap();
    fs::remove_file(&output).unwrap();
    assert_eq!(written, canonicalize(PEOPLE.as_bytes()));
}

#[test]
fn csvdump_reports_malformed_quoting() {
    let input = env::temp_dir()
        .join(format!("csvdump-malformed-{}.csv", process::id()));
    fs::write(&input, "a,\"b\r\n").unwrap();

    let mut cmd = cmd_for_example("csvdump");
    cmd.arg(&input);
    let out = cmd_output(&mut cmd);
    fs::remove_file(&input).unwrap();
    assert!(out.stderr().contains("quoted entry is never closed"));
}

#[test]
fn csvdump_usage() {
    let mut cmd = cmd_for_example("csvdump");
    let out = cmd_output(&mut cmd);
    assert!(out.stderr().contains("usage: csvdump"));
}

/// Return the target/debug directory path.
fn debug_dir() -> PathBuf {
    env::current_exe()
        .expect("test binary path")
        .parent()
        .expect("test binary directory")
        .parent()
        .expect("example binary directory")
        .to_path_buf()
}

/// Return the directory containing the example test binaries.
fn example_bin_dir() -> PathBuf {
    debug_dir().join("examples")
}

/// Return the repo root directory path.
fn repo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Return the directory containing the demo data.
fn data_dir() -> PathBuf {
    repo_dir().join("demos").join("data")
}

/// Return a command ready to execute the given example binary.
///
/// The command's current directory is set to the repo root.
fn cmd_for_example(name: &str) -> Command {
    let mut cmd = Command::new(example_bin_dir().join(name));
    cmd.current_dir(repo_dir());
    cmd
}

/// Run the command to completion, capturing its output.
fn cmd_output(cmd: &mut Command) -> Output {
    cmd.stdout(process::Stdio::piped());
    cmd.stderr(process::Stdio::piped());
    let child = cmd.spawn().expect("command spawns successfully");
    Output::new(cmd, child)
}

struct Output {
    stdout: String,
    stderr: String,
    command: String,
    status: process::ExitStatus,
}

impl Output {
    fn new(cmd: &mut Command, child: process::Child) -> Output {
        let out = child.wait_with_output().expect("command runs successfully");
        let stdout = String::from_utf8(out.stdout).expect("valid utf-8 (stdout)");
        let stderr = String::from_utf8(out.stderr).expect("valid utf-8 (stderr)");
        Output {
            stdout,
            stderr,
            command: format!("{:?}", cmd),
            status: out.status,
        }
    }

    /// Returns stdout, panicking if the command failed.
    fn stdout(&self) -> &str {
        if !self.status.success() {
            self.fail("command failed but expected success!");
        }
        &self.stdout
    }

    /// Returns stderr, panicking if the command succeeded.
    fn stderr(&self) -> &str {
        if self.status.success() {
            self.fail("command succeeded but expected failure!");
        }
        &self.stderr
    }

    fn fail(&self, msg: &str) -> ! {
        panic!(
            "\n\n==== {} ====\n{}\
             \n\ncwd: {}\
             \n\nstatus: {}\
             \n\nstdout: {}\
             \n\nstderr: {}\
             \n\n=====\n",
            self.command,
            msg,
            repo_dir().display(),
            self.status,
            self.stdout,
            self.stderr
        );
    }
}
