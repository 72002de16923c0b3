use {
    anyhow::{anyhow, bail, Context, Result},
    argh::FromArgs,
    base64::{prelude::BASE64_STANDARD, Engine},
    identity_tlv::{
        fields::single_values, BerCodec, Collector, FieldMap, IdentityField, DEFAULT_MAX_DEPTH,
    },
    serde_json::{Map, Value},
    std::{
        fs,
        io::{self, Read},
        str::FromStr,
    },
    tracing::info,
    tracing_subscriber::EnvFilter,
};

/// Decode TLV (ASN.1 BER/DER) encoded identity records into numbered fields.
#[derive(FromArgs)]
struct Args {
    /// transport encoding of the input: base64, hex or raw (default base64)
    #[argh(option, default = "Transport::Base64")]
    transport: Transport,

    /// only accept DER
    #[argh(switch)]
    der: bool,

    /// accept every BER deviation, including trailing data, silently
    #[argh(switch)]
    permissive: bool,

    /// maximum nesting depth of the encoding
    #[argh(option, default = "DEFAULT_MAX_DEPTH")]
    max_depth: usize,

    /// print the decoded element tree instead of the fields
    #[argh(switch)]
    tree: bool,

    /// keep only the first string of every field
    #[argh(switch)]
    first: bool,

    /// key known identity card fields by name
    #[argh(switch)]
    named: bool,

    /// warn when a field id is collected more than once
    #[argh(switch)]
    duplicates: bool,

    /// input files or glob patterns, standard input when absent
    #[argh(positional)]
    inputs: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transport {
    Base64,
    Hex,
    Raw,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            "raw" => Ok(Self::Raw),
            _ => Err(format!("unknown transport '{s}', expected base64, hex or raw")),
        }
    }
}

impl Transport {
    fn decode(self, input: Vec<u8>) -> Result<Vec<u8>> {
        Ok(match self {
            Self::Base64 => BASE64_STANDARD
                .decode(compact(&input))
                .context("Invalid base64 input")?,
            Self::Hex => hex::decode(compact(&input)).context("Invalid hex input")?,
            Self::Raw => input,
        })
    }
}

/// Text transports may be wrapped over several lines.
fn compact(input: &[u8]) -> Vec<u8> {
    input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect()
}

impl Args {
    fn codec(&self) -> BerCodec {
        let codec = if self.der {
            BerCodec::der()
        } else if self.permissive {
            BerCodec::permissive()
        } else {
            BerCodec::default()
        };
        codec.with_max_depth(self.max_depth)
    }

    fn inputs(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for pattern in &self.inputs {
            let before = paths.len();
            for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern {pattern}"))? {
                paths.push(entry?.display().to_string());
            }
            if paths.len() == before {
                bail!("No input matches {pattern}");
            }
        }
        Ok(paths)
    }

    fn render(&self, fields: FieldMap) -> Value {
        let key = |id: i32| {
            if self.named {
                IdentityField::label(id)
            } else {
                id.to_string()
            }
        };
        let map: Map<String, Value> = if self.first {
            single_values(&fields)
                .into_iter()
                .map(|(id, value)| (key(id), Value::from(value)))
                .collect()
        } else {
            fields
                .into_iter()
                .map(|(id, values)| (key(id), Value::from(values)))
                .collect()
        };
        Value::Object(map)
    }

    fn process(&self, input: Vec<u8>) -> Result<Value> {
        let bytes = self.transport.decode(input)?;
        let codec = self.codec();
        let root = codec.decode(&bytes)?;
        if self.tree {
            return Ok(Value::from(root.to_string()));
        }
        let collector = Collector::new(codec).with_duplicate_reports(self.duplicates);
        let fields = collector.collect(&root);
        info!(count = fields.len(), "collected fields");
        Ok(self.render(fields))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Args = argh::from_env();
    ensure_flags(&args)?;

    let inputs = args.inputs()?;
    if inputs.is_empty() {
        let mut input = Vec::new();
        io::stdin().read_to_end(&mut input).context("Reading standard input")?;
        let value = args.process(input)?;
        print(&args, &value)?;
        return Ok(());
    }

    let mut results = Map::new();
    for path in &inputs {
        let input = fs::read(path).with_context(|| format!("Reading {path}"))?;
        let value = args
            .process(input)
            .with_context(|| format!("Decoding {path}"))?;
        results.insert(path.clone(), value);
    }
    if results.len() == 1 {
        let (_, value) = results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No results"))?;
        print(&args, &value)
    } else {
        print(&args, &Value::Object(results))
    }
}

fn ensure_flags(args: &Args) -> Result<()> {
    if args.der && args.permissive {
        bail!("--der and --permissive are mutually exclusive");
    }
    if args.tree && (args.first || args.named) {
        bail!("--tree prints elements, not fields; drop --first and --named");
    }
    Ok(())
}

fn print(args: &Args, value: &Value) -> Result<()> {
    match value {
        Value::String(tree) if args.tree => print!("{tree}"),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
