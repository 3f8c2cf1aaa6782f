//! End-to-end decode fixtures.
//!
//! Each test builds the raw bitstream a sensor would put on the air
//! (preamble + line-coded payload), turns it into pulses the way the radio
//! interrupt would deliver them (runs of equal bits merge into one pulse),
//! and drives the full pipeline: ring buffer -> coherent-signal scanner ->
//! dispatcher -> protocol decoder -> field extraction.

use tpms_core::crc::{crc16, crc8, sum_bytes, xor_bytes};
use tpms_core::fields::FieldValue;
use tpms_core::{bitmap, MsgInfo, RawSamples, SensorList, SignalScanner};

/// Symbol period of the synthetic transmitter.
const UNIT_US: u32 = 100;
/// Glitch filter, as a modulation preset would supply it.
const MIN_US: u32 = 50;

const CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// Pulse-stream construction
// ---------------------------------------------------------------------------

/// Append a bitstream as pulses: every run of equal bits becomes one pulse
/// of `run_len * UNIT_US` microseconds.
fn feed_pulses(buf: &RawSamples, stream: &str) {
    let mut chars = stream.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1u32;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        buf.append(c == '1', run * UNIT_US);
    }
}

/// Run the full pipeline over a bitstream and return the scanner.
fn scan_stream(stream: &str) -> SignalScanner {
    let buf = RawSamples::new(CAPACITY);
    feed_pulses(&buf, stream);
    let mut scanner = SignalScanner::new(CAPACITY);
    scanner.scan(&buf, MIN_US);
    scanner
}

/// Scan a stream and unwrap the decoded message.
fn decode_stream(stream: &str) -> MsgInfo {
    let mut scanner = scan_stream(stream);
    assert!(scanner.decoded, "stream did not decode");
    scanner.take_decoded().expect("decoded message")
}

// ---------------------------------------------------------------------------
// Reference encoders
// ---------------------------------------------------------------------------

fn bits_of(bytes: &[u8]) -> Vec<bool> {
    let mut out = Vec::with_capacity(bytes.len() * 8);
    for &b in bytes {
        for j in (0..8).rev() {
            out.push(b >> j & 1 == 1);
        }
    }
    out
}

/// Manchester: 0 -> "01", 1 -> "10".
fn manchester(bytes: &[u8]) -> String {
    bits_of(bytes)
        .iter()
        .map(|&b| if b { "10" } else { "01" })
        .collect()
}

/// Zero-inverted Manchester: 0 -> "10", 1 -> "01".
fn manchester_zero_inv(bytes: &[u8]) -> String {
    bits_of(bytes)
        .iter()
        .map(|&b| if b { "01" } else { "10" })
        .collect()
}

/// Sliding differential Manchester: reference clock pair then one half-bit
/// pair per data bit. Mid-bit transition always present; a transition at
/// the start of a bit encodes 0, none encodes 1.
fn diff_manchester_sliding(data: &[bool], first_half: bool) -> String {
    let mut halves = vec![first_half, !first_half];
    let mut last = !first_half;
    for &d in data {
        let first = if d { last } else { !last };
        halves.push(first);
        halves.push(!first);
        last = !first;
    }
    halves.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Pairwise differential Manchester with the decoder's exact bit sense:
/// each pair starts opposite the previous pair's second half, and equal
/// halves encode 1.
fn diff_manchester_pairwise(data: &[bool], mut previous: bool) -> String {
    let mut s = String::new();
    for &d in data {
        let b0 = !previous;
        let b1 = if d { b0 } else { !b0 };
        s.push(if b0 { '1' } else { '0' });
        s.push(if b1 { '1' } else { '0' });
        previous = b1;
    }
    s
}

// ---------------------------------------------------------------------------
// Field accessors
// ---------------------------------------------------------------------------

fn tire_id(info: &MsgInfo) -> Vec<u8> {
    match &info.fields.find("Tire ID").expect("Tire ID field").value {
        FieldValue::Bytes(b) => b.clone(),
        other => panic!("Tire ID has wrong type: {other:?}"),
    }
}

fn float_field(info: &MsgInfo, name: &str) -> f32 {
    match info.fields.find(name).unwrap_or_else(|| panic!("{name} field")).value {
        FieldValue::Float { value, .. } => value,
        ref other => panic!("{name} has wrong type: {other:?}"),
    }
}

fn temperature_c(info: &MsgInfo) -> i64 {
    match info.fields.find("Temperature C").expect("Temperature C").value {
        FieldValue::SignedInt(v) => v,
        ref other => panic!("Temperature C has wrong type: {other:?}"),
    }
}

fn approx(a: f32, b: f32) {
    assert!((a - b).abs() < 0.01, "expected {b}, got {a}");
}

// ---------------------------------------------------------------------------
// Spec regression scenarios
// ---------------------------------------------------------------------------

/// PMV-107J frame: 66 diff-Manchester bits whose realignment yields the
/// given 9 payload bytes.
fn pmv107j_stream(payload: &[u8; 9]) -> String {
    let mut data = vec![payload[0] >> 1 & 1 == 1, payload[0] & 1 == 1];
    data.extend(bits_of(&payload[1..]));
    assert_eq!(data.len(), 66);
    format!("111110{}", diff_manchester_sliding(&data, true))
}

#[test]
fn pmv107j_decodes_reference_frame() {
    let mut payload = [0x00, 0x12, 0x34, 0x56, 0x78, 0xC8, 0x37, 0x5A, 0x00];
    payload[8] = crc8(&payload[..8], 0x00, 0x13);

    let info = decode_stream(&pmv107j_stream(&payload));
    assert_eq!(info.decoder_name, Some("Toyota PMV-107J"));
    assert_eq!(tire_id(&info), vec![0x04, 0x8D, 0x15, 0x9E]);
    approx(float_field(&info, "Pressure kpa"), (200.0 - 40.0) * 2.48);
    assert_eq!(temperature_c(&info), 50);
}

#[test]
fn pmv107j_truncated_frame_rejected() {
    // 64 data bits instead of 66: the codec comes up short and no decoder
    // accepts, so no field set is ever populated.
    let mut payload = [0x00u8, 0x12, 0x34, 0x56, 0x78, 0xC8, 0x37, 0x5A, 0x00];
    payload[8] = crc8(&payload[..8], 0x00, 0x13);
    let mut data = vec![payload[0] >> 1 & 1 == 1, payload[0] & 1 == 1];
    data.extend(bits_of(&payload[1..]));
    data.truncate(64);
    let stream = format!("111110{}", diff_manchester_sliding(&data, true));

    let mut scanner = scan_stream(&stream);
    assert!(!scanner.decoded);
    assert!(scanner.take_decoded().is_none());
    // The candidate run was latched, but with an empty field set.
    let info = scanner.msg_info.as_ref().expect("latched candidate");
    assert!(info.fields.is_empty());
    assert!(info.bits.is_none());
}

#[test]
fn elantra2012_decodes_reference_frame() {
    let mut payload = [80u8, 90, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0x00, 0x07);
    let stream = format!("0111000101010101{}", manchester(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Elantra2012 TPMS"));
    assert_eq!(tire_id(&info), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    approx(float_field(&info, "Pressure kpa"), 140.0);
    assert_eq!(temperature_c(&info), 40);
}

#[test]
fn elantra2012_bad_crc_rejected() {
    let mut payload = [80u8, 90, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0x00, 0x07) ^ 0x01;
    let stream = format!("0111000101010101{}", manchester(&payload));

    let scanner = scan_stream(&stream);
    assert!(!scanner.decoded);
}

#[test]
fn bmw_gen45_decodes_reference_frame() {
    let mut payload = [0x42u8, 0xB1, 0xB2, 0xB3, 0xB4, 100, 72, 0x01, 0x02, 0x03, 0x00];
    payload[10] = crc8(&payload[..10], 0xAA, 0x2F);
    let stream = format!("1010101001011001{}", manchester_zero_inv(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("BMW/Audi TPMS"));
    assert_eq!(tire_id(&info), vec![0xB1, 0xB2, 0xB3, 0xB4]);
    approx(float_field(&info, "Pressure kpa"), 245.0);
    assert_eq!(temperature_c(&info), 20);
}

#[test]
fn audi_short_frame_decodes() {
    // Audi sensors use the same framing with an 8-byte payload.
    let mut payload = [0x42u8, 0xA1, 0xA2, 0xA3, 0xA4, 90, 70, 0x00];
    payload[7] = crc8(&payload[..7], 0xAA, 0x2F);
    let stream = format!("1010101001011001{}", manchester_zero_inv(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("BMW/Audi TPMS"));
    assert_eq!(tire_id(&info), vec![0xA1, 0xA2, 0xA3, 0xA4]);
    approx(float_field(&info, "Pressure kpa"), 90.0 * 2.45);
    assert_eq!(temperature_c(&info), 18);
}

#[test]
fn bmw_gen3_decodes_reference_frame() {
    let mut payload = [0xC1u8, 0xC2, 0xC3, 0xC4, 143, 65, 0x01, 0x02, 0x03, 0, 0];
    let crc = crc16(&payload[..9], 0x0000, 0x1021);
    payload[9] = (crc >> 8) as u8;
    payload[10] = (crc & 0xFF) as u8;

    let stream = format!(
        "11001100{}{}",
        "1100110011001101",
        diff_manchester_sliding(&bits_of(&payload), true)
    );

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("BMW Gen2/3 TPMS"));
    assert_eq!(tire_id(&info), vec![0xC1, 0xC2, 0xC3, 0xC4]);
    approx(float_field(&info, "Pressure kpa"), 250.0);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn bmw_gen2_ten_byte_frame_decodes() {
    let mut payload = [0xD1u8, 0xD2, 0xD3, 0xD4, 123, 60, 0x07, 0x08, 0, 0];
    let crc = crc16(&payload[..8], 0x0000, 0x1021);
    payload[8] = (crc >> 8) as u8;
    payload[9] = (crc & 0xFF) as u8;

    let stream = format!(
        "1100110011001100{}{}",
        "1100110011001101",
        diff_manchester_sliding(&bits_of(&payload), true)
    );

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("BMW Gen2/3 TPMS"));
    approx(float_field(&info, "Pressure kpa"), (123.0 - 43.0) * 2.5);
}

#[test]
fn porsche_decodes_reference_frame() {
    let mut payload = [0x9Au8, 0x9B, 0x9C, 0x9D, 140, 65, 0x00, 0x01, 0, 0];
    let crc = crc16(&payload[..8], 0xFFFF, 0x1021);
    payload[8] = (crc >> 8) as u8;
    payload[9] = (crc & 0xFF) as u8;
    // Whole frame must reduce to zero, the check the decoder relies on.
    assert_eq!(crc16(&payload, 0xFFFF, 0x1021), 0);

    let stream = format!(
        "110011001100110011001010{}",
        diff_manchester_sliding(&bits_of(&payload), true)
    );

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Porsche TPMS"));
    assert_eq!(tire_id(&info), vec![0x9A, 0x9B, 0x9C, 0x9D]);
    approx(float_field(&info, "Pressure kpa"), 140.0 * 2.5 - 100.0);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn schrader_smd3ma4_decodes_reference_frame() {
    // 39 bits: flags(3) = 010, id(24) = 0x123456, pressure(10) = 164,
    // check(2) = 01.
    let mut bits = String::new();
    bits.push_str("010");
    for j in (0..24).rev() {
        bits.push(if 0x123456u32 >> j & 1 == 1 { '1' } else { '0' });
    }
    for j in (0..10).rev() {
        bits.push(if 164u32 >> j & 1 == 1 { '1' } else { '0' });
    }
    bits.push_str("01");
    assert_eq!(bits.len(), 39);

    let encoded: String = bits
        .chars()
        .map(|c| if c == '1' { "10" } else { "01" })
        .collect();
    let stream = format!("010101011110{encoded}");

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Schrader SMD3MA4"));
    assert_eq!(tire_id(&info), vec![0x12, 0x34, 0x56]);
    approx(float_field(&info, "Pressure psi"), 32.8);
    assert!(info.fields.find("Temperature C").is_none());
}

#[test]
fn gm_aftermarket_decodes_reference_frame() {
    let mut payload = [0u8; 17];
    payload[6] = 0x01;
    payload[7] = 0x5A;
    payload[8..13].copy_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55]);
    payload[13] = 0x0F;
    payload[14] = 80; // 220 kPa
    payload[15] = 85; // 25 C
    payload[16] = sum_bytes(&payload[6..16], 0);

    // The zero-inverted Manchester image of the six 0x00 lead-in bytes is
    // itself the 48 x "10" preamble.
    let stream = manchester_zero_inv(&payload);
    assert!(stream.starts_with(&"10".repeat(48)));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("GM Aftermarket"));
    let id = tire_id(&info);
    assert_eq!(id, vec![0x11, 0x22, 0x33, 0x44, 0x55]);
    assert!(id.iter().any(|&b| b != 0));
    let kpa = float_field(&info, "Pressure kpa");
    approx(kpa, 220.0);
    assert!(kpa < 1000.0);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn gm_bad_checksum_rejected() {
    let mut payload = [0u8; 17];
    payload[8..13].copy_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55]);
    payload[14] = 80;
    payload[16] = sum_bytes(&payload[6..16], 0) ^ 0xFF;

    let scanner = scan_stream(&manchester_zero_inv(&payload));
    assert!(!scanner.decoded);
}

// ---------------------------------------------------------------------------
// Remaining registry coverage
// ---------------------------------------------------------------------------

#[test]
fn renault_decodes() {
    // Pressure raw 292 -> 219 kPa, temperature raw 55 -> 25 C.
    let mut payload = [0x01u8, 0x24, 55, 0xAB, 0xCD, 0xEF, 0x00, 0x00, 0x00];
    payload[8] = crc8(&payload[..8], 0x00, 0x07);

    let stream = format!(
        "01010101010110{}",
        diff_manchester_pairwise(&bits_of(&payload), true)
    );

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Renault TPMS"));
    assert_eq!(tire_id(&info), vec![0xAB, 0xCD, 0xEF]);
    approx(float_field(&info, "Pressure kpa"), 292.0 * 0.75);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn toyota_eu_decodes() {
    // Pressure raw 148 -> 30 PSI, temperature raw 65 -> 25 C.
    let mut payload = [0x12u8, 0x34, 0x56, 0x78, 0x4A, 0x20, 0x80, 0x00, 0x00];
    payload[8] = crc8(&payload[..8], 0x80, 0x07);

    let stream = format!(
        "00111110{}",
        diff_manchester_pairwise(&bits_of(&payload), true)
    );

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Toyota TPMS"));
    assert_eq!(tire_id(&info), vec![0x12, 0x34, 0x56, 0x78]);
    approx(float_field(&info, "Pressure psi"), 30.0);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn schrader_gen1_decodes() {
    let mut payload = [0x8Au8, 0xBC, 0xDE, 0xF0, 100, 75, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0xF0, 0x07);
    let stream = format!("0001111100{}", manchester(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Schrader TPMS"));
    assert_eq!(tire_id(&info), vec![0x0A, 0xBC, 0xDE, 0xF0]);
    approx(float_field(&info, "Pressure kpa"), 250.0);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn schrader_eg53ma4_decodes() {
    // Temperature byte is Fahrenheit on the wire: 77 F -> 25 C.
    let mut payload = [0x00u8, 0x31, 0x41, 0x59, 0x26, 80, 77, 0x00, 0x00, 0x00];
    payload[9] = sum_bytes(&payload[..9], 0);
    let stream = format!("0001111101{}", manchester(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Schrader EG53MA4"));
    assert_eq!(tire_id(&info), vec![0x31, 0x41, 0x59, 0x26]);
    approx(float_field(&info, "Pressure kpa"), 80.0 * 2.75);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn citroen_decodes() {
    let mut payload = [0x00u8, 0xDE, 0xAD, 0xBE, 0xEF, 161, 75, 0x64, 0x00, 0x00];
    payload[9] = xor_bytes(&payload[1..9], 0);
    assert_eq!(xor_bytes(&payload[1..10], 0), 0);
    let stream = format!("01010101010101010110{}", manchester(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Citroen TPMS"));
    assert_eq!(tire_id(&info), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    approx(float_field(&info, "Pressure kpa"), 161.0 * 1.364);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn ford_decodes() {
    // Pressure raw 133 -> 33.25 PSI, temperature raw 81 -> 25 C.
    let mut payload = [0xF0u8, 0x0D, 0xCA, 0xFE, 133, 81, 0x00, 0x00];
    payload[7] = sum_bytes(&payload[..7], 0);
    let stream = format!("010101010101010101010110{}", manchester(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Ford TPMS"));
    assert_eq!(tire_id(&info), vec![0xF0, 0x0D, 0xCA, 0xFE]);
    approx(float_field(&info, "Pressure psi"), 33.25);
    assert_eq!(temperature_c(&info), 25);
}

#[test]
fn hyundai_kia_decodes() {
    let mut payload = [0x01u8, 0xCA, 0xFE, 0xBA, 0xBE, 0x50, 88, 75, 0x00, 0x00];
    payload[9] = xor_bytes(&payload[..9], 0);
    let stream = format!("0101010101010110{}", manchester(&payload));

    let info = decode_stream(&stream);
    assert_eq!(info.decoder_name, Some("Hyundai/Kia TPMS"));
    assert_eq!(tire_id(&info), vec![0xCA, 0xFE, 0xBA, 0xBE]);
    approx(float_field(&info, "Pressure kpa"), 220.0);
    assert_eq!(temperature_c(&info), 25);
}

// ---------------------------------------------------------------------------
// Dispatcher and scanner properties
// ---------------------------------------------------------------------------

#[test]
fn dispatcher_payload_matches_bitmap() {
    let mut payload = [80u8, 90, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0x00, 0x07);
    let stream = format!("0111000101010101{}", manchester(&payload));

    let info = decode_stream(&stream);
    let bits = info.bits.as_ref().expect("payload bits");

    // Payload is ceil(pulses_count / 8) bytes...
    assert_eq!(bits.len(), (info.pulses_count as usize + 7) / 8);
    // ...and bit-for-bit equal to the sampled stream from start_off on
    // (positions past the transmission read as zero).
    let chars: Vec<char> = stream.chars().collect();
    for k in 0..info.pulses_count {
        let pos = (info.start_off + k) as usize;
        let expected = pos < chars.len() && chars[pos] == '1';
        assert_eq!(bitmap::get(bits, k), expected, "bit {k}");
    }
}

#[test]
fn pulses_count_is_a_display_span_hint() {
    // The Manchester decoders over-count the consumed span by up to 2x;
    // anything in [span, 2 * span] is acceptable downstream.
    let mut payload = [80u8, 90, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0x00, 0x07);
    let stream = format!("0111000101010101{}", manchester(&payload));
    let span = stream.len() as u32;

    let info = decode_stream(&stream);
    assert!(info.pulses_count >= span / 2 && info.pulses_count <= span * 2);
}

#[test]
fn scanner_short_pulse_estimate_in_range() {
    let mut payload = [80u8, 90, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0x00, 0x07);
    let stream = format!("0111000101010101{}", manchester(&payload));

    let info = decode_stream(&stream);
    assert!(info.short_pulse_dur > MIN_US && info.short_pulse_dur < 4000);
    assert_eq!(info.short_pulse_dur, UNIT_US);
}

#[test]
fn decode_counters_track_one_success() {
    let mut payload = [80u8, 90, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0x00, 0x07);
    let stream = format!("0111000101010101{}", manchester(&payload));

    let scanner = scan_stream(&stream);
    let snap = scanner.stats.snapshot();
    assert_eq!(snap.scan_count, 1);
    assert!(snap.coherent_count >= 1);
    assert!(snap.decode_try_count >= 1);
    assert_eq!(snap.decode_ok_count, 1);
}

#[test]
fn repeated_receptions_update_sensor_list() {
    let mut payload = [80u8, 90, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
    payload[7] = crc8(&payload[..7], 0x00, 0x07);
    let stream = format!("0111000101010101{}", manchester(&payload));

    let buf = RawSamples::new(CAPACITY);
    feed_pulses(&buf, stream.as_str());
    let mut scanner = SignalScanner::new(CAPACITY);
    let mut sensors = SensorList::new();

    for tick in 0..2u64 {
        scanner.scan(&buf, MIN_US);
        let info = scanner.take_decoded().expect("decoded");
        assert!(sensors.extract_and_store(&info, tick));
    }

    assert_eq!(sensors.len(), 1);
    let sensor = sensors.get(0).unwrap();
    assert_eq!(sensor.id_hex(), "DEADBEEF");
    assert_eq!(sensor.rx_count, 2);
    assert_eq!(sensor.protocol, "Elantra2012 TPMS");
    approx(sensor.pressure_kpa.unwrap(), 140.0);
    assert_eq!(sensor.temperature_c, Some(40));
}
