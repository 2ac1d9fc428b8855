use clap::{Parser, Subcommand};
use serde_json::Value;
use std::error::Error;
use webmusic::bridge::{CommandEnvelope, EnvelopeCodec, HostEvent};
use webmusic::data::{Action, ObjectType};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Encode and decode bridge envelopes", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an envelope string
    ///
    /// Example: webmusic_envelope encode player call actionVolume --parameter 0.5
    Encode {
        #[clap(help = "Object type: api, player, playlist, tracklist")]
        object_type: ObjectType,

        #[clap(help = "Action: get, set, call, signal or a numeric code")]
        action: Action,

        #[clap(help = "Property, function or signal name")]
        identifier: String,

        #[clap(long, help = "Parameter as JSON; plain text is used as a string")]
        parameter: Option<String>,
    },

    /// Show both layers of an envelope string
    ///
    /// Example: webmusic_envelope decode '{"Type":1,"Action":0,"Identifier":"volume"}'
    Decode {
        message: String,

        #[clap(long, help = "Also show how a host routes the message")]
        route: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let codec = EnvelopeCodec::new();

    match args.command {
        Commands::Encode { object_type, action, identifier, parameter } => {
            let parameter = parameter.map(|text| {
                serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text))
            });
            let envelope = CommandEnvelope::new(object_type, action, identifier, parameter);
            println!("{}", codec.encode(&envelope)?);
        }

        Commands::Decode { message, route } => {
            let outer: Value = serde_json::from_str(&message)?;
            println!("Outer layer:");
            println!("{}", serde_json::to_string_pretty(&outer)?);

            let envelope = codec.decode(&message)?;
            println!("Envelope: {}", envelope);
            if let Some(parameter) = &envelope.parameter {
                println!("Parameter:");
                println!("{}", serde_json::to_string_pretty(parameter)?);
                println!("Arguments: {}", envelope.arguments().len());
            }

            if route {
                println!("Routed as: {:?}", HostEvent::from_envelope(envelope)?);
            }
        }
    }

    Ok(())
}
