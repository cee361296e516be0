//! List attached HID devices and report what `info` sees for the MJC3.

use hidapi::HidApi;
use mjc3::backends::HidApiTransport;
use mjc3::{Config, DeviceIdentity, Dispatcher, Response};

fn main() {
    mjc3::logger::init("mjc3=debug");

    match HidApi::new() {
        Ok(api) => {
            for info in api.device_list() {
                let marker = if info.vendor_id() == DeviceIdentity::MJC3.vendor_id
                    && info.product_id() == DeviceIdentity::MJC3.product_id
                {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} VID:PID={:04x}:{:04x} up=0x{:02x} u=0x{:02x} iface={} prod={:?} ser={:?} path={}",
                    info.vendor_id(),
                    info.product_id(),
                    info.usage_page(),
                    info.usage(),
                    info.interface_number(),
                    info.product_string(),
                    info.serial_number(),
                    info.path().to_string_lossy()
                );
            }
        }
        Err(e) => eprintln!("cannot enumerate HID devices: {e}"),
    }

    let mut joystick = Dispatcher::new(HidApiTransport::new(), Config::default());
    for response in [Response::Info(joystick.info()), Response::Flag(joystick.test())] {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("cannot serialize response: {e}"),
        }
    }
    joystick.close();
}
