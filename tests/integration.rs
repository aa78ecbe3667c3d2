//! Integration tests for the padlink host-testable logic.
//!
//! Each test plays both firmware images: gamepads produce frames through
//! the sampler and notifier, the console consumes them through the link
//! manager and the input facade.

use padlink::ble::adv_parser::{build_adv_data, build_scan_data, extract_device_name};
use padlink::broadcast::BroadcastReceiver;
use padlink::codec::MAX_WIRE_LEN;
use padlink::config::{GAMEPAD_NAME, MAX_CONTROLLERS, SERVICE_UUID_LE};
use padlink::debounce::ButtonSampler;
use padlink::link::{AttemptVerdict, LinkAction, LinkManager};
use padlink::notifier::Notifier;
use padlink::{
    Button, ButtonFrame, ButtonLayout, ConnectError, ControllerInputs, Error, LinkConfig,
    LinkIdentity, SlotId,
};

type Console = LinkManager<u32>;

fn gamepad(n: u8) -> LinkIdentity {
    LinkIdentity::new([n, 0xAA, 0xBB, 0xCC, 0xDD, 0xC0])
}

/// Answer every pending connect request with a successful subscription.
fn connect_all(console: &mut Console, now: u64) -> heapless::Vec<SlotId, 4> {
    let mut slots = heapless::Vec::new();
    while let Some(LinkAction::Connect(peer)) = console.tick(now) {
        let slot = console.on_subscribed(now, peer, u32::from(peer.bytes()[0])).unwrap();
        slots.push(slot).unwrap();
    }
    slots
}

fn wire(frame: ButtonFrame, link: &LinkConfig) -> heapless::Vec<u8, MAX_WIRE_LEN> {
    let mut buf = [0u8; MAX_WIRE_LEN];
    let len = frame.serialize(link.polarity, &mut buf);
    heapless::Vec::from_slice(&buf[..len]).unwrap()
}

#[test]
fn gamepad_advertisement_is_recognised() {
    let adv = build_adv_data(&SERVICE_UUID_LE);
    let scan = build_scan_data(GAMEPAD_NAME);
    assert_eq!(extract_device_name(&scan).as_str(), GAMEPAD_NAME);

    let mut console = Console::new(LinkConfig::new());
    assert!(console.on_advertisement_data(gamepad(1), &adv));
    // The scan response alone does not carry the service.
    assert!(!console.on_advertisement_data(gamepad(2), &scan));
}

#[test]
fn two_gamepads_end_to_end() {
    let link = LinkConfig::new();
    let inputs: ControllerInputs = ControllerInputs::new();
    let mut console = Console::new(link);
    let adv = build_adv_data(&SERVICE_UUID_LE);

    for n in 1..=3 {
        console.on_advertisement_data(gamepad(n), &adv);
    }
    let slots = connect_all(&mut console, 0);
    assert_eq!(slots.len(), MAX_CONTROLLERS);
    assert_eq!(console.queued(), 1);
    for &slot in &slots {
        inputs.publish(slot, console.slot(slot).unwrap().frame);
    }

    // Player 2 holds UP + PAUSE.
    let mut sampler = ButtonSampler::with_interval(link.layout, 20);
    let mut notifier = Notifier::new();
    notifier.on_connected();
    notifier.on_subscribed(ButtonFrame::released(link.layout));
    notifier.on_send_ok();
    let mut levels = [true; 11];
    levels[2] = false; // UP
    levels[10] = false; // PAUSE
    let mut sent = None;
    for t in (0..=30).step_by(10) {
        if let Some(frame) = sampler.sample(&levels, t) {
            sent = notifier.on_buttons_changed(frame);
        }
    }
    let payload = wire(sent.unwrap(), &link);
    notifier.on_send_ok();

    let p2 = console.slot_for(&gamepad(2)).unwrap();
    let frame = console.on_notification(p2, &payload).unwrap();
    inputs.publish(p2, frame);

    let snap = inputs.snapshot_all();
    assert!(snap.is_pressed(p2, Button::Up));
    assert!(snap.is_pressed(p2, Button::Pause));
    let p1 = console.slot_for(&gamepad(1)).unwrap();
    assert!(snap.is_connected(p1));
    assert!(!snap.is_pressed(p1, Button::Up));

    // Player 1 leaves; the waiting gamepad takes its id.
    let gone = console.on_disconnect(p1).unwrap();
    assert_eq!(gone.handle, 1);
    inputs.clear(p1);
    assert!(!inputs.is_connected(p1));

    let slots = connect_all(&mut console, 1_000);
    assert_eq!(&slots[..], &[p1]);
    assert_eq!(console.slot_for(&gamepad(3)), Some(p1));
}

#[test]
fn unreachable_gamepad_does_not_block_the_queue() {
    let mut console = Console::new(LinkConfig::new().with_timeouts(3_000, 1_000));
    console.on_advertisement(gamepad(1), &[padlink::config::SERVICE_UUID]);
    console.on_advertisement(gamepad(2), &[padlink::config::SERVICE_UUID]);

    let mut now = 0;
    let mut gave_up = false;
    while !gave_up {
        match console.tick(now) {
            Some(LinkAction::Connect(peer)) => {
                assert_eq!(peer, gamepad(1));
                let verdict = console.on_attempt_failed(now, peer, ConnectError::ConnectFailed);
                gave_up = matches!(verdict, AttemptVerdict::Abandoned(ConnectError::Timeout));
            }
            Some(LinkAction::GaveUp { peer, .. }) => {
                assert_eq!(peer, gamepad(1));
                gave_up = true;
            }
            None => {}
        }
        now += 250;
        assert!(now < 10_000, "attempt never ended");
    }

    let slots = connect_all(&mut console, now);
    assert_eq!(slots.len(), 1);
    assert_eq!(console.slot_for(&gamepad(2)), Some(slots[0]));
    assert_eq!(console.slot_for(&gamepad(1)), None);
}

#[test]
fn broadcast_path_feeds_the_same_facade() {
    let inputs: ControllerInputs = ControllerInputs::new();
    let mut receiver: BroadcastReceiver = BroadcastReceiver::new(LinkConfig::new());

    let pressed = ButtonFrame::from_pressed(ButtonLayout::Eleven, &[Button::X, Button::M]);
    let datagram = pressed.bits().to_le_bytes();

    let (slot, frame) = receiver.on_datagram(gamepad(7), &datagram).unwrap();
    inputs.publish(slot, frame);
    assert!(inputs.get_button_state(slot, Button::X));
    assert!(inputs.get_button_state(slot, Button::M));

    receiver.on_datagram(gamepad(8), &[0, 0]).unwrap();
    assert_eq!(
        receiver.on_datagram(gamepad(9), &datagram),
        Err(Error::SlotsFull)
    );
}
