/**
 * Device Listing Example
 *
 * Loads telldus-core (set TELLCORE_LIBRARY to override the library path),
 * lists every configured device with the methods it supports, and prints the
 * controller reported by the library, if any.
 */
use tellcore::{Methods, TelldusCore};

fn main() -> tellcore::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("--- tellcore - Devices ---");
    let core = TelldusCore::open()?;

    let devices = core.devices()?;
    for device in &devices {
        let methods = device.methods(Methods::all())?;
        println!(
            "{} type={} methods={}",
            device.describe()?,
            device.device_type()?,
            methods
        );
    }
    println!("[INFO] {} device(s)", devices.len());

    for controller in core.controllers()? {
        let firmware = controller
            .get("firmware")
            .unwrap_or_else(|e| format!("<{}>", e));
        println!(
            "Controller {} '{}' type={:?} available={} firmware={}",
            controller.id(),
            controller.name(),
            controller.controller_type(),
            controller.available(),
            firmware
        );
    }
    Ok(())
}
