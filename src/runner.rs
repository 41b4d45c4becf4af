use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Command, FromArgMatches as _};
use log::{debug, info};

use crate::demographics::DemographicTable;
use crate::error::TimelineError;
use crate::log::{level_for_verbosity, set_log_level, LevelFilter, LogSpec};
use crate::model::TransitionModel;
use crate::parameters::{Parameters, ParametersFile};
use crate::population::{synthesize_population, Individual};
use crate::report::{write_report, ReportOptions};
use crate::simulator::StateSimulator;
use crate::summary::{Summary, SummaryRow};
use crate::timeline::{Timeline, TimelineRow};

/// Command line arguments. Values given here override those in the `--config` file.
#[derive(Args, Debug, Clone, Default)]
pub struct BaseArgs {
    /// Random seed [default: 0]
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional path for report output [default: .]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix prepended to the report file names
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Replace report files that already exist
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Enable logging at a level (`info`) or per module (`epi_timeline::simulator=trace`)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Comma separated list of countries to simulate
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Real people represented by one simulated individual [default: 1e6]
    #[arg(long)]
    pub sample_ratio: Option<f64>,

    /// First simulated day, YYYY-MM-DD [default: 2021-04-01]
    #[arg(long)]
    pub start_date: Option<String>,

    /// Last simulated day, inclusive, YYYY-MM-DD [default: 2022-04-30]
    #[arg(long)]
    pub end_date: Option<String>,

    /// Countries CSV with population and age-group percentages
    #[arg(long)]
    pub demographics: Option<PathBuf>,

    /// Transition model JSON; the built-in model is used when absent
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Print the countries in the demographics file and exit
    #[arg(long)]
    pub list_countries: bool,
}

/// Everything a run needs once the command line and parameters file are merged.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub parameters: Parameters,
    pub demographics: PathBuf,
    pub model: Option<PathBuf>,
    pub report_options: ReportOptions,
}

impl BaseArgs {
    /// The parameters file named by `--config`, if any, with every value given on the command
    /// line written over it.
    ///
    /// # Errors
    /// Fails if the parameters file cannot be loaded.
    pub fn merged_parameters(&self) -> Result<ParametersFile, TimelineError> {
        let file = match &self.config {
            Some(path) => ParametersFile::from_json_path(path)?,
            None => ParametersFile::default(),
        };
        Ok(ParametersFile {
            countries: if self.countries.is_empty() {
                file.countries
            } else {
                Some(self.countries.clone())
            },
            sample_ratio: self.sample_ratio.or(file.sample_ratio),
            start_date: self.start_date.clone().or(file.start_date),
            end_date: self.end_date.clone().or(file.end_date),
            random_seed: self.random_seed.or(file.random_seed),
            demographics: self.demographics.clone().or(file.demographics),
            model: self.model.clone().or(file.model),
            output_dir: self.output_dir.clone().or(file.output_dir),
        })
    }
}

impl RunConfig {
    /// Merges `args` over the parameters file named by `args.config`, if any.
    ///
    /// # Errors
    /// Fails if the parameters file cannot be loaded, a required value is missing, or a value
    /// does not validate.
    pub fn from_args(args: &BaseArgs) -> Result<Self, TimelineError> {
        let file = args.merged_parameters()?;
        let parameters = Parameters::from_file(&file)?;
        if parameters.countries.is_empty() {
            return Err(TimelineError::MissingParameter("countries"));
        }

        let demographics = file
            .demographics
            .ok_or(TimelineError::MissingParameter("demographics"))?;

        let mut report_options = ReportOptions::new();
        report_options
            .file_prefix(args.file_prefix.clone())
            .overwrite(args.force_overwrite);
        if let Some(output_dir) = file.output_dir {
            report_options.directory(output_dir);
        }

        Ok(RunConfig {
            parameters,
            demographics,
            model: file.model,
            report_options,
        })
    }
}

/// The products of one run.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub population: Vec<Individual>,
    pub timeline: Timeline,
    pub summary: Summary,
}

/// Runs the whole pipeline in memory: synthesize the population, expand it over the date
/// range, simulate every person and count states per day and country.
///
/// An empty country selection is valid here and gives empty outputs.
///
/// # Errors
/// Fails if the parameters or model do not validate, a country is unknown, or a simulated
/// person reaches a state the model does not cover.
pub fn run_simulation(
    parameters: &Parameters,
    demographics: &DemographicTable,
    model: &TransitionModel,
) -> Result<SimulationOutput, TimelineError> {
    parameters.validate()?;
    model.validate()?;
    info!(
        "Simulating {:?} at ratio {} from {} to {} with seed {}",
        parameters.countries,
        parameters.sample_ratio,
        parameters.dates.start(),
        parameters.dates.end(),
        parameters.random_seed
    );

    let population = synthesize_population(
        demographics,
        &parameters.countries,
        parameters.sample_ratio,
    )?;
    debug!("synthesized {} individuals", population.len());

    let simulator = StateSimulator::new(model, parameters.random_seed);
    let timeline = simulator.simulate_population(&population, parameters.dates)?;
    debug!("simulated {} timeline rows", timeline.len());

    let summary = Summary::from_timeline(&timeline);
    debug!("summarized into {} rows", summary.len());

    Ok(SimulationOutput {
        population,
        timeline,
        summary,
    })
}

/// Writes the timeline and summary reports and returns their paths. Both targets are checked
/// before either is written, so a refused overwrite leaves no partial output.
///
/// # Errors
/// See [`write_report`].
pub fn write_reports(
    output: &SimulationOutput,
    options: &ReportOptions,
) -> Result<(PathBuf, PathBuf), TimelineError> {
    options.check_available(&[
        options.path_for::<TimelineRow>(),
        options.path_for::<SummaryRow>(),
    ])?;
    let timeline_path = write_report::<TimelineRow, _>(options, &output.timeline)?;
    let summary_rows: Vec<SummaryRow> = output.summary.rows().collect();
    let summary_path = write_report(options, &summary_rows)?;
    Ok((timeline_path, summary_path))
}

fn create_cli() -> Command {
    let cli = Command::new("epi-timeline")
        .about("Simulates per-person epidemic state timelines from country demographics");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation configured from the process's command line arguments. Returns `None`
/// when `--list-countries` was given, after printing the countries.
///
/// # Errors
/// Returns an error if argument parsing, input loading, simulation or report writing fails
pub fn run_with_args() -> Result<Option<SimulationOutput>, Box<dyn Error + Send + Sync>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    run_with_args_internal(&args)
}

/// Same as [`run_with_args`], but parses `itr` instead of the process arguments. The first
/// item is the binary name.
///
/// # Errors
/// Returns an error if argument parsing, input loading, simulation or report writing fails
pub fn run_with_args_from<I, T>(itr: I) -> Result<Option<SimulationOutput>, Box<dyn Error + Send + Sync>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = create_cli().try_get_matches_from(itr)?;
    let args = BaseArgs::from_arg_matches(&matches)?;
    run_with_args_internal(&args)
}

fn configure_logging(args: &BaseArgs) -> Result<(), TimelineError> {
    let verbosity = level_for_verbosity(args.verbose);
    match &args.log_level {
        Some(spec) => spec.parse::<LogSpec>()?.apply(verbosity),
        None if verbosity != LevelFilter::Off => set_log_level(verbosity),
        None => {}
    }
    Ok(())
}

fn run_with_args_internal(
    args: &BaseArgs,
) -> Result<Option<SimulationOutput>, Box<dyn Error + Send + Sync>> {
    configure_logging(args)?;

    if args.list_countries {
        let demographics = args
            .merged_parameters()?
            .demographics
            .ok_or(TimelineError::MissingParameter("demographics"))?;
        for country in DemographicTable::from_csv_path(demographics)?.countries() {
            println!("{country}");
        }
        return Ok(None);
    }

    let config = RunConfig::from_args(args)?;
    if let Some(path) = &args.config {
        println!("Loaded parameters from: {}", path.display());
    }

    let demographics = DemographicTable::from_csv_path(&config.demographics)?;
    let model = match &config.model {
        Some(path) => TransitionModel::from_json_path(path)?,
        None => TransitionModel::builtin()?,
    };

    let output = run_simulation(&config.parameters, &demographics, &model)?;
    let (timeline_path, summary_path) = write_reports(&output, &config.report_options)?;

    println!(
        "Simulated {} individuals over {} days ({} timeline rows)",
        output.population.len(),
        config.parameters.dates.num_days(),
        output.timeline.len()
    );
    println!("Timeline written to {}", timeline_path.display());
    println!("Summary written to {}", summary_path.display());
    Ok(Some(output))
}
