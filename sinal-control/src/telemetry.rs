//! Telemetria
//!
//! Sequência somente-anexação de [`ControlSample`], um registro por passo
//! controlado. Falhas de escrita não interrompem o laço: são logadas e
//! contadas no resumo.
//!
//! Formato JSONL: um objeto por linha, campos na ordem da struct.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::{ControlError, ControlResult};

/// Registro de um passo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSample {
    /// Tempo simulado (lido antes do avanço do relógio)
    pub time: u64,
    /// Índice do passo no laço
    pub step: u64,
    pub vehicles: f64,
    pub waiting_time: f64,
    pub jam_length: f64,
    pub max_lane_vehicles: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_vehicles: Option<f64>,
    /// Força de disparo por regra (diagnóstico)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<f64>>,
    /// Saída nítida do passo
    pub output: f64,
    /// Passou a histerese em ao menos uma faixa
    pub applied: bool,
    /// Saída veio de política de fallback
    #[serde(default)]
    pub fallback: bool,
}

/// Destino de telemetria
pub trait TelemetrySink {
    fn append(&mut self, sample: &ControlSample) -> ControlResult<()>;

    fn flush(&mut self) -> ControlResult<()> {
        Ok(())
    }
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Box<T> {
    fn append(&mut self, sample: &ControlSample) -> ControlResult<()> {
        (**self).append(sample)
    }

    fn flush(&mut self) -> ControlResult<()> {
        (**self).flush()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSONL
// ═══════════════════════════════════════════════════════════════════════════════

/// Escreve um JSON por linha
pub struct JsonlSink<W: Write> {
    writer: W,
    records: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Cria (ou trunca) o arquivo
    pub fn create(path: &Path) -> ControlResult<Self> {
        let file = File::create(path)
            .map_err(|e| ControlError::Telemetry(format!("Failed to create {}: {}", path.display(), e)))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, records: 0 }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, record: &T) -> ControlResult<()> {
        let line = serde_json::to_string(record).map_err(|e| ControlError::Telemetry(e.to_string()))?;
        writeln!(self.writer, "{}", line).map_err(|e| ControlError::Telemetry(e.to_string()))?;
        self.records += 1;
        Ok(())
    }
}

impl<W: Write> TelemetrySink for JsonlSink<W> {
    fn append(&mut self, sample: &ControlSample) -> ControlResult<()> {
        self.write_line(sample)
    }

    fn flush(&mut self) -> ControlResult<()> {
        self.writer.flush().map_err(|e| ControlError::Telemetry(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMÓRIA / NULO
// ═══════════════════════════════════════════════════════════════════════════════

/// Mantém as amostras em memória
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub samples: Vec<ControlSample>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TelemetrySink for MemorySink {
    fn append(&mut self, sample: &ControlSample) -> ControlResult<()> {
        self.samples.push(sample.clone());
        Ok(())
    }
}

/// Descarta tudo
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn append(&mut self, _sample: &ControlSample) -> ControlResult<()> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DADOS DE TREINO
// ═══════════════════════════════════════════════════════════════════════════════

/// Linha do conjunto de treino: entradas e duração decidida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub num_vehicles: f64,
    pub waiting_time: f64,
    /// Maior contagem entre faixas no passo
    pub peak_vehicles: f64,
    pub green_duration: f64,
}

impl From<&ControlSample> for TrainingRecord {
    fn from(sample: &ControlSample) -> Self {
        Self {
            num_vehicles: sample.vehicles,
            waiting_time: sample.waiting_time,
            peak_vehicles: sample.max_lane_vehicles,
            green_duration: sample.output,
        }
    }
}

/// Exporta [`TrainingRecord`]s em JSONL
pub struct TrainingSink<W: Write> {
    inner: JsonlSink<W>,
}

impl TrainingSink<BufWriter<File>> {
    pub fn create(path: &Path) -> ControlResult<Self> {
        Ok(Self {
            inner: JsonlSink::create(path)?,
        })
    }
}

impl<W: Write> TrainingSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: JsonlSink::new(writer),
        }
    }

    pub fn records(&self) -> usize {
        self.inner.records()
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: Write> TelemetrySink for TrainingSink<W> {
    fn append(&mut self, sample: &ControlSample) -> ControlResult<()> {
        self.inner.write_line(&TrainingRecord::from(sample))
    }

    fn flush(&mut self) -> ControlResult<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};

    fn sample(step: u64, output: f64) -> ControlSample {
        ControlSample {
            time: step,
            step,
            vehicles: 12.0,
            waiting_time: 4.5,
            jam_length: 3.0,
            max_lane_vehicles: 5.0,
            peak_vehicles: None,
            strengths: Some(vec![0.25, 0.75]),
            output,
            applied: true,
            fallback: false,
        }
    }

    #[test]
    fn test_jsonl_field_order() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.append(&sample(0, 20.0)).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let time = text.find("\"time\"").unwrap();
        let readings = text.find("\"vehicles\"").unwrap();
        let strengths = text.find("\"strengths\"").unwrap();
        let output = text.find("\"output\"").unwrap();
        let applied = text.find("\"applied\"").unwrap();
        assert!(time < readings && readings < strengths && strengths < output && output < applied);
        assert!(!text.contains("peak_vehicles"));
    }

    #[test]
    fn test_jsonl_one_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.jsonl");
        let mut sink = JsonlSink::create(&path).unwrap();
        for i in 0..3 {
            sink.append(&sample(i, 10.0 + i as f64)).unwrap();
        }
        sink.flush().unwrap();
        assert_eq!(sink.records(), 3);

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = BufReader::new(file).lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 3);
        let back: ControlSample = serde_json::from_str(&lines[2]).unwrap();
        assert_eq!(back, sample(2, 12.0));
    }

    #[test]
    fn test_training_sink_record() {
        let mut sink = TrainingSink::new(Vec::new());
        sink.append(&sample(0, 33.0)).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let record: TrainingRecord = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(
            record,
            TrainingRecord {
                num_vehicles: 12.0,
                waiting_time: 4.5,
                peak_vehicles: 5.0,
                green_duration: 33.0,
            }
        );
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.append(&sample(0, 1.0)).unwrap();
        assert_eq!(sink.samples.len(), 1);
        assert!(NullSink.append(&sample(0, 1.0)).is_ok());
    }
}
