/**
 * Sensor Values Example
 *
 * Prints the current value of every data type the reported sensor supports,
 * one JSON object per line.
 */
use tellcore::TelldusCore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let core = TelldusCore::open()?;
    let sensors = core.sensors()?;
    if sensors.is_empty() {
        println!("[INFO] No sensors reported");
        return Ok(());
    }

    for sensor in &sensors {
        println!(
            "Sensor {} ({}/{})",
            sensor.id(),
            sensor.protocol(),
            sensor.model()
        );
        for datatype in sensor.datatypes() {
            let value = sensor.value(datatype)?;
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
