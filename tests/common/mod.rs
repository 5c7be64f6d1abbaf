use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A small slice of the equipment table with the real column layout:
/// ポジション(0), 種類(1), 優先度(2), 名前(3), 入手先(4).
pub const SAMPLE_CSV: &str = "\
ポジション,種類,優先度,名前,入手先
GK,ミサンガ,2,鉄壁のミサンガ,スピリット交換所
FW,ペンダント,1,豪炎ペンダント,VSストア
DMF,シューズ,3,疾風スパイク,クロニクル百貨店
FW,シューズ,1,韋駄天スパイク,VSストア
AMF,スペシャル,2,司令塔の証,クロニクル百貨店
DDF,ミサンガ,1,守護のミサンガ,スピリット交換所
";

/// Write the sample dataset into a temp dir and return its path.
/// Callers keep the TempDir alive for the duration of the test.
pub fn write_sample_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("soubi_clean.csv");
    fs::write(&path, SAMPLE_CSV).expect("Failed to write sample CSV");
    path
}
