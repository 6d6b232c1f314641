//! Fixture plugins for the end-to-end stack scenarios (spec.md §8).

use async_trait::async_trait;
use netlogd_core::kernel::constants::CORE_ABI_VERSION;
use netlogd_core::plugin::{DataType, Key, KeyFlags, KeyType, Plugin, Pluginstance, ReturnCode, Value};

/// Emits a single `n: u32` key. The value is fixed at construction so each
/// scenario can feed a specific number without a real capture source.
pub struct Src {
    pub n: u32,
}

#[async_trait]
impl Plugin for Src {
    fn name(&self) -> &str {
        "SRC"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![Key::template("n", KeyType::U32, KeyFlags::empty())]
    }
    fn input_type(&self) -> DataType {
        DataType::Source
    }
    fn output_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        instance.set_output("n", Value::U32(self.n));
        ReturnCode::Ok
    }
}

/// Reads `n`, records the last value it observed, returns OK.
pub struct Sink {
    pub observed: std::sync::Mutex<Option<u32>>,
}

impl Sink {
    pub fn new() -> Self {
        Self { observed: std::sync::Mutex::new(None) }
    }
}

#[async_trait]
impl Plugin for Sink {
    fn name(&self) -> &str {
        "SINK"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![Key::template("n", KeyType::U32, KeyFlags::empty())]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn input_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    fn output_type(&self) -> DataType {
        DataType::Sink
    }
    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        if let Some(Value::U32(n)) = instance.input("n").cloned() {
            *self.observed.lock().unwrap() = Some(n);
        }
        ReturnCode::Ok
    }
}

/// Also exports `x` — used alongside `Src` (which exports both `n` and `x`)
/// to exercise S2's key-shadowing rule: the stage closer to the sink wins.
pub struct Dec;

#[async_trait]
impl Plugin for Dec {
    fn name(&self) -> &str {
        "DEC"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![Key::template("x", KeyType::U32, KeyFlags::empty())]
    }
    fn input_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    fn output_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        instance.set_output("x", Value::U32(999));
        ReturnCode::Ok
    }
}

/// Exports both `n` and `x`, so a downstream stack can tell which
/// producer's `x` actually got bound.
pub struct SrcWithX;

#[async_trait]
impl Plugin for SrcWithX {
    fn name(&self) -> &str {
        "SRC"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![
            Key::template("n", KeyType::U32, KeyFlags::empty()),
            Key::template("x", KeyType::U32, KeyFlags::empty()),
        ]
    }
    fn input_type(&self) -> DataType {
        DataType::Source
    }
    fn output_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        instance.set_output("n", Value::U32(7));
        instance.set_output("x", Value::U32(111));
        ReturnCode::Ok
    }
}

/// A sink that reads `x` and stores which value it saw.
pub struct SinkReadsX {
    pub observed: std::sync::Mutex<Option<u32>>,
}

impl SinkReadsX {
    pub fn new() -> Self {
        Self { observed: std::sync::Mutex::new(None) }
    }
}

#[async_trait]
impl Plugin for SinkReadsX {
    fn name(&self) -> &str {
        "SINK"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![Key::template("x", KeyType::U32, KeyFlags::empty())]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn input_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    fn output_type(&self) -> DataType {
        DataType::Sink
    }
    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        if let Some(Value::U32(x)) = instance.input("x").cloned() {
            *self.observed.lock().unwrap() = Some(x);
        }
        ReturnCode::Ok
    }
}

/// Declares a mandatory input `y` that no earlier stage in S3 ever produces.
pub struct SinkNeedsY;

#[async_trait]
impl Plugin for SinkNeedsY {
    fn name(&self) -> &str {
        "SINK_NEEDS_Y"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![Key::template("y", KeyType::U32, KeyFlags::empty())]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn input_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    fn output_type(&self) -> DataType {
        DataType::Sink
    }
    async fn interpret(&self, _instance: &mut Pluginstance) -> ReturnCode {
        ReturnCode::Ok
    }
}

/// Returns STOP or OK depending on a flag flipped between dispatches, to
/// exercise S4's short-circuit and recovery behavior.
pub struct FilterStop {
    pub stop_next: std::sync::atomic::AtomicBool,
}

impl FilterStop {
    pub fn new(stop_first: bool) -> Self {
        Self { stop_next: std::sync::atomic::AtomicBool::new(stop_first) }
    }
}

#[async_trait]
impl Plugin for FilterStop {
    fn name(&self) -> &str {
        "FILTER_STOP"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![Key::template("n", KeyType::U32, KeyFlags::empty())]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![Key::template("n", KeyType::U32, KeyFlags::empty())]
    }
    fn input_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    fn output_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        if self.stop_next.swap(false, std::sync::atomic::Ordering::SeqCst) {
            return ReturnCode::Stop;
        }
        if let Some(Value::U32(n)) = instance.input("n").cloned() {
            instance.set_output("n", Value::U32(n));
        }
        ReturnCode::Ok
    }
}

/// Emits a `PACKET`-tagged output, for S5's adjacency mismatch.
pub struct SrcPacket;

#[async_trait]
impl Plugin for SrcPacket {
    fn name(&self) -> &str {
        "SRC_PACKET"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn input_type(&self) -> DataType {
        DataType::Source
    }
    fn output_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }
    async fn interpret(&self, _instance: &mut Pluginstance) -> ReturnCode {
        ReturnCode::Ok
    }
}

/// Consumes a `FLOW`-tagged input, for S5's adjacency mismatch.
pub struct SinkFlow;

#[async_trait]
impl Plugin for SinkFlow {
    fn name(&self) -> &str {
        "SINK_FLOW"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn input_type(&self) -> DataType {
        DataType::Intermediate("FLOW")
    }
    fn output_type(&self) -> DataType {
        DataType::Sink
    }
    async fn interpret(&self, _instance: &mut Pluginstance) -> ReturnCode {
        ReturnCode::Ok
    }
}

/// Records every signal it receives, for S6's fan-out check.
pub struct SignalRecordingSink {
    pub signals: std::sync::Mutex<Vec<i32>>,
}

impl SignalRecordingSink {
    pub fn new() -> Self {
        Self { signals: std::sync::Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl Plugin for SignalRecordingSink {
    fn name(&self) -> &str {
        "SIGNAL_SINK"
    }
    fn version(&self) -> &str {
        CORE_ABI_VERSION
    }
    fn input_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn output_schema(&self) -> Vec<Key> {
        vec![]
    }
    fn input_type(&self) -> DataType {
        DataType::Source
    }
    fn output_type(&self) -> DataType {
        DataType::Sink
    }
    async fn interpret(&self, _instance: &mut Pluginstance) -> ReturnCode {
        ReturnCode::Ok
    }
    fn signal(&self, _instance: &mut Pluginstance, signum: i32) {
        self.signals.lock().unwrap().push(signum);
    }
}
