use gb_psg::apu::{Apu, FRAME_SEQUENCER_PERIOD};

fn powered() -> Apu {
    let mut apu = Apu::default();
    apu.write(0xFF26, 0x80); // enable APU
    apu
}

fn run(apu: &mut Apu, cycles: u32) {
    for _ in 0..cycles {
        apu.step();
    }
}

#[test]
fn channel1_triggers_when_dac_on() {
    let mut apu = powered();
    apu.write(0xFF12, 0xF0); // DAC on
    apu.write(0xFF14, 0x80); // trigger channel 1
    assert_eq!(apu.read(0xFF26) & 0x01, 0x01);
}

#[test]
fn channel1_trigger_ignored_when_dac_off() {
    let mut apu = powered();
    apu.write(0xFF12, 0x00); // DAC off
    apu.write(0xFF14, 0x80); // attempt trigger
    assert_eq!(apu.read(0xFF26) & 0x01, 0x00);
}

#[test]
fn channel2_triggers_when_dac_on() {
    let mut apu = powered();
    apu.write(0xFF17, 0x08); // volume 0 but increase: DAC on
    apu.write(0xFF19, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x02, 0x02);
}

#[test]
fn channel2_trigger_ignored_when_dac_off() {
    let mut apu = powered();
    apu.write(0xFF17, 0x07); // pace only
    apu.write(0xFF19, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x02, 0x00);
}

#[test]
fn channel3_triggers_when_dac_on() {
    let mut apu = powered();
    apu.write(0xFF1A, 0x80);
    apu.write(0xFF1E, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x04, 0x04);
}

#[test]
fn channel3_trigger_ignored_when_dac_off() {
    let mut apu = powered();
    apu.write(0xFF1A, 0x00);
    apu.write(0xFF1E, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x04, 0x00);
}

#[test]
fn channel4_triggers_when_dac_on() {
    let mut apu = powered();
    apu.write(0xFF21, 0xF0);
    apu.write(0xFF23, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x08, 0x08);
}

#[test]
fn channel4_trigger_ignored_when_dac_off() {
    let mut apu = powered();
    apu.write(0xFF21, 0x00);
    apu.write(0xFF23, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x08, 0x00);
}

#[test]
fn dac_off_after_trigger_disables_each_channel() {
    let mut apu = powered();
    apu.write(0xFF12, 0xF0);
    apu.write(0xFF14, 0x80);
    apu.write(0xFF17, 0xF0);
    apu.write(0xFF19, 0x80);
    apu.write(0xFF1A, 0x80);
    apu.write(0xFF1E, 0x80);
    apu.write(0xFF21, 0xF0);
    apu.write(0xFF23, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x0F, 0x0F);

    apu.write(0xFF12, 0x00);
    assert_eq!(apu.read(0xFF26) & 0x0F, 0x0E);
    apu.write(0xFF17, 0x00);
    assert_eq!(apu.read(0xFF26) & 0x0F, 0x0C);
    apu.write(0xFF1A, 0x00);
    assert_eq!(apu.read(0xFF26) & 0x0F, 0x08);
    apu.write(0xFF21, 0x00);
    assert_eq!(apu.read(0xFF26) & 0x0F, 0x00);
}

#[test]
fn dac_on_again_does_not_restart_channel() {
    let mut apu = powered();
    apu.write(0xFF17, 0xF0);
    apu.write(0xFF19, 0x80);
    apu.write(0xFF17, 0x00);
    apu.write(0xFF17, 0xF0);
    assert_eq!(apu.read(0xFF26) & 0x02, 0x00);
    apu.write(0xFF19, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x02, 0x02);
}

#[test]
fn channel1_disabled_by_length_timer() {
    let mut apu = powered();
    apu.write(0xFF11, 0x3E); // length = 2
    apu.write(0xFF12, 0xF0);
    apu.write(0xFF14, 0xC0); // trigger with length enabled
    run(&mut apu, FRAME_SEQUENCER_PERIOD); // step 0 clocks length
    assert_eq!(apu.read(0xFF26) & 0x01, 0x01);
    run(&mut apu, 2 * FRAME_SEQUENCER_PERIOD); // steps 1 and 2
    assert_eq!(apu.read(0xFF26) & 0x01, 0x00);
}

#[test]
fn sweep_overflow_disables_channel1() {
    let mut apu = powered();
    apu.write(0xFF10, 0x01); // period=0, shift=1 (addition)
    apu.write(0xFF12, 0xF0);
    apu.write(0xFF13, 0xF8);
    apu.write(0xFF14, 0x87); // high bits=7, trigger -> overflow
    assert_eq!(apu.read(0xFF26) & 0x01, 0x00);
}

#[test]
fn triggering_does_not_touch_other_channels() {
    let mut apu = powered();
    apu.write(0xFF21, 0xF0);
    apu.write(0xFF23, 0x80);
    apu.write(0xFF12, 0xF0);
    apu.write(0xFF14, 0x80);
    assert_eq!(apu.read(0xFF26) & 0x0F, 0x09);
}

#[test]
fn disabled_channel_outputs_silence() {
    let mut apu = powered();
    apu.write(0xFF11, 0xC0); // 75% duty
    apu.write(0xFF12, 0xF0);
    apu.write(0xFF13, 0xFF);
    apu.write(0xFF14, 0x87); // period 4
    run(&mut apu, 4);
    assert_eq!(apu.ch1_duty_pos(), 1);
    assert_eq!(apu.channel_output(1), 15);
    apu.write(0xFF12, 0x00);
    assert_eq!(apu.channel_output(1), 0);
}
