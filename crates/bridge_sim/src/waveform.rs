//! Waveform recording of the core's boundary signals.
//!
//! Provides the [`WaveformRecorder`] trait and a VCD (IEEE 1364) writer. Files
//! whose name ends in `.gz` are written through a gzip encoder.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::SimError;
use crate::time::SimTime;

/// A sink for value changes of named signals.
pub trait WaveformRecorder {
    /// Opens a new scope (hierarchy level).
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError>;

    /// Closes the current scope.
    fn end_scope(&mut self) -> Result<(), SimError>;

    /// Registers a signal of `width` bits.
    fn register_signal(&mut self, name: &'static str, width: u32) -> Result<(), SimError>;

    /// Records the value of a signal at `time`. Unchanged values are dropped.
    fn record_change(
        &mut self,
        time: SimTime,
        name: &'static str,
        value: u64,
    ) -> Result<(), SimError>;

    /// Flushes buffered output.
    fn finalize(&mut self) -> Result<(), SimError>;
}

#[derive(Debug)]
struct VcdSignal {
    name: &'static str,
    code: String,
    width: u32,
    last: Option<u64>,
}

/// VCD recorder. Identifier codes are printable ASCII starting from `!`.
#[derive(Debug)]
pub struct VcdRecorder<W: Write> {
    writer: W,
    signals: Vec<VcdSignal>,
    header_written: bool,
    current_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a recorder writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            signals: Vec::new(),
            header_written: false,
            current_time: None,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_header(&mut self) -> Result<(), SimError> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  bridge sync core simulator")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1fs")?;
        writeln!(self.writer, "$end")?;
        self.header_written = true;
        Ok(())
    }

    /// Base-94 identifier code; index 94 and above use several characters.
    fn make_id_code(index: usize) -> String {
        let mut code = String::new();
        let mut rest = index;
        loop {
            code.push(char::from(b'!' + (rest % 94) as u8));
            rest /= 94;
            if rest == 0 {
                return code;
            }
            rest -= 1;
        }
    }

    fn format_value(value: u64, width: u32) -> String {
        if width == 1 {
            let bit = if value & 1 == 1 { "1" } else { "0" };
            bit.to_string()
        } else {
            let bits: String = (0..width)
                .rev()
                .map(|i| if (value >> i) & 1 == 1 { '1' } else { '0' })
                .collect();
            format!("b{bits}")
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        self.ensure_header()?;
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn register_signal(&mut self, name: &'static str, width: u32) -> Result<(), SimError> {
        self.ensure_header()?;
        let code = Self::make_id_code(self.signals.len());
        writeln!(self.writer, "$var wire {width} {code} {name} $end")?;
        self.signals.push(VcdSignal {
            name,
            code,
            width,
            last: None,
        });
        Ok(())
    }

    fn record_change(
        &mut self,
        time: SimTime,
        name: &'static str,
        value: u64,
    ) -> Result<(), SimError> {
        let index = self
            .signals
            .iter()
            .position(|s| s.name == name)
            .ok_or(SimError::UnregisteredSignal(name))?;
        if self.signals[index].last == Some(value) {
            return Ok(());
        }

        self.ensure_header()?;
        if self.current_time != Some(time.fs) {
            if self.current_time.is_none() {
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "$dumpvars")?;
            }
            writeln!(self.writer, "#{}", time.fs)?;
            self.current_time = Some(time.fs);
        }

        let signal = &mut self.signals[index];
        signal.last = Some(value);
        let text = Self::format_value(value, signal.width);
        if signal.width == 1 {
            writeln!(self.writer, "{text}{}", signal.code)?;
        } else {
            writeln!(self.writer, "{text} {}", signal.code)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        if self.current_time.is_none() {
            self.ensure_header()?;
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// A waveform file on disk, plain or gzip-compressed.
pub enum WaveformFile {
    /// Uncompressed VCD.
    Plain(BufWriter<File>),
    /// VCD inside a gzip stream.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl WaveformFile {
    /// Creates `path`, choosing gzip when the extension is `gz`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(WaveformFile::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(WaveformFile::Plain(file))
        }
    }

    /// Writes any trailer and flushes the file.
    pub fn finish(self) -> io::Result<()> {
        match self {
            WaveformFile::Plain(mut w) => w.flush(),
            WaveformFile::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for WaveformFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            WaveformFile::Plain(w) => w.write(buf),
            WaveformFile::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            WaveformFile::Plain(w) => w.flush(),
            WaveformFile::Gzip(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn recorder() -> VcdRecorder<Vec<u8>> {
        VcdRecorder::new(Vec::new())
    }

    fn text(rec: VcdRecorder<Vec<u8>>) -> String {
        String::from_utf8(rec.into_inner()).unwrap()
    }

    #[test]
    fn id_codes() {
        assert_eq!(VcdRecorder::<Vec<u8>>::make_id_code(0), "!");
        assert_eq!(VcdRecorder::<Vec<u8>>::make_id_code(93), "~");
        assert_eq!(VcdRecorder::<Vec<u8>>::make_id_code(94).len(), 2);
    }

    #[test]
    fn value_formatting() {
        assert_eq!(VcdRecorder::<Vec<u8>>::format_value(1, 1), "1");
        assert_eq!(VcdRecorder::<Vec<u8>>::format_value(0, 1), "0");
        assert_eq!(VcdRecorder::<Vec<u8>>::format_value(0xB6, 8), "b10110110");
    }

    #[test]
    fn header_scope_and_vars() {
        let mut rec = recorder();
        rec.begin_scope("bridge").unwrap();
        rec.register_signal("fv_o", 1).unwrap();
        rec.register_signal("data_i", 8).unwrap();
        rec.end_scope().unwrap();
        rec.finalize().unwrap();
        let out = text(rec);
        assert!(out.starts_with("$version"));
        assert!(out.contains("$timescale\n  1fs\n$end"));
        assert!(out.contains("$scope module bridge $end"));
        assert!(out.contains("$var wire 1 ! fv_o $end"));
        assert!(out.contains("$var wire 8 \" data_i $end"));
        assert!(out.contains("$upscope $end"));
        assert!(out.ends_with("$enddefinitions $end\n"));
    }

    #[test]
    fn changes_are_deduplicated() {
        let mut rec = recorder();
        rec.register_signal("lv_o", 1).unwrap();
        rec.register_signal("data_i", 8).unwrap();
        rec.record_change(SimTime::ZERO, "lv_o", 0).unwrap();
        rec.record_change(SimTime::ZERO, "data_i", 0xFF).unwrap();
        rec.record_change(SimTime::from_fs(10), "lv_o", 0).unwrap();
        rec.record_change(SimTime::from_fs(20), "lv_o", 1).unwrap();
        rec.finalize().unwrap();
        let out = text(rec);
        assert!(out.contains("$dumpvars\n#0\n0!\nb11111111 \"\n#20\n1!\n"));
        assert!(!out.contains("#10"));
    }

    #[test]
    fn unregistered_signal_is_an_error() {
        let mut rec = recorder();
        let err = rec.record_change(SimTime::ZERO, "missing", 1).unwrap_err();
        assert!(matches!(err, SimError::UnregisteredSignal("missing")));
    }

    #[test]
    fn gzip_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.vcd.gz");
        let mut rec = VcdRecorder::new(WaveformFile::create(&path).unwrap());
        rec.register_signal("heartbeat", 1).unwrap();
        rec.record_change(SimTime::from_fs(5), "heartbeat", 1).unwrap();
        rec.finalize().unwrap();
        rec.into_inner().finish().unwrap();

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.contains("$var wire 1 ! heartbeat $end"));
        assert!(decoded.contains("#5\n1!"));
    }

    #[test]
    fn plain_file_is_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.vcd");
        let mut rec = VcdRecorder::new(WaveformFile::create(&path).unwrap());
        rec.register_signal("align_o", 1).unwrap();
        rec.finalize().unwrap();
        rec.into_inner().finish().unwrap();
        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.contains("align_o"));
    }
}
