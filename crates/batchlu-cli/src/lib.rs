//! Problem files, solve reports and size queries behind the `batchlu` tool.

use anyhow::{Context, Result, anyhow, bail};
use batchlu::{
    Complex32, Complex64, GesvDims, GetrfDims, GetriDims, GetriOutofplaceDims, GetrsDims,
    Handle, LapackInt, Operation, Scalar, WorkspacePlan, gesv_outofplace_plan, getrf_npvt_plan,
    getrf_plan, getri_outofplace_plan, getri_plan, getrs_plan, solve_batch,
};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Operation to size
    #[arg(long, value_enum, default_value_t = Op::Gesv)]
    pub op: Op,

    /// Matrix order
    #[arg(long)]
    pub n: i64,

    /// Right-hand sides (gesv, getrs)
    #[arg(long, default_value_t = 1)]
    pub nrhs: i64,

    /// Number of instances
    #[arg(long, default_value_t = 1)]
    pub batch: i64,

    /// Element kind
    #[arg(long, value_enum, default_value_t = Precision::D)]
    pub precision: Precision,

    /// Index width in bits
    #[arg(long, value_enum, default_value_t = IndexWidth::W32)]
    pub index: IndexWidth,

    /// Operation applied to A (getrs)
    #[arg(long, value_enum, default_value_t = Trans::N)]
    pub trans: Trans,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Op {
    Gesv,
    Getrf,
    GetrfNpvt,
    Getrs,
    Getri,
    GetriOutofplace,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Gesv => "gesv_outofplace",
            Op::Getrf => "getrf",
            Op::GetrfNpvt => "getrf_npvt",
            Op::Getrs => "getrs",
            Op::Getri => "getri",
            Op::GetriOutofplace => "getri_outofplace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    S,
    #[default]
    D,
    C,
    Z,
}

impl Precision {
    pub fn prefix(self) -> char {
        match self {
            Precision::S => 's',
            Precision::D => 'd',
            Precision::C => 'c',
            Precision::Z => 'z',
        }
    }

    fn is_complex(self) -> bool {
        matches!(self, Precision::C | Precision::Z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexWidth {
    #[value(name = "32")]
    W32,
    #[value(name = "64")]
    W64,
}

impl IndexWidth {
    pub fn bits(self) -> u32 {
        match self {
            IndexWidth::W32 => 32,
            IndexWidth::W64 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Trans {
    N,
    T,
    C,
}

impl From<Trans> for Operation {
    fn from(t: Trans) -> Self {
        match t {
            Trans::N => Operation::None,
            Trans::T => Operation::Transpose,
            Trans::C => Operation::ConjugateTranspose,
        }
    }
}

/// Batched problem read by `batchlu solve`.
///
/// Matrices and right-hand sides are packed column-major, instance after
/// instance. Complex kinds take their imaginary parts from the `*_im`
/// arrays (zero when absent).
#[derive(Debug, Deserialize)]
pub struct Problem {
    pub n: usize,
    #[serde(default = "one")]
    pub nrhs: usize,
    pub batch_size: usize,
    #[serde(default)]
    pub precision: Precision,
    pub matrices: Vec<f64>,
    pub rhs: Vec<f64>,
    #[serde(default)]
    pub matrices_im: Option<Vec<f64>>,
    #[serde(default)]
    pub rhs_im: Option<Vec<f64>>,
}

fn one() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct SolveReport {
    pub precision: char,
    pub n: usize,
    pub nrhs: usize,
    pub batch_size: usize,
    pub info: Vec<i32>,
    pub singular: Vec<usize>,
    pub solutions: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solutions_im: Option<Vec<f64>>,
}

/// Answer a size query for the requested element kind and index width.
pub fn plan(args: &PlanArgs) -> Result<WorkspacePlan> {
    match (args.precision, args.index) {
        (Precision::S, IndexWidth::W32) => plan_for::<f32, i32>(args),
        (Precision::D, IndexWidth::W32) => plan_for::<f64, i32>(args),
        (Precision::C, IndexWidth::W32) => plan_for::<Complex32, i32>(args),
        (Precision::Z, IndexWidth::W32) => plan_for::<Complex64, i32>(args),
        (Precision::S, IndexWidth::W64) => plan_for::<f32, i64>(args),
        (Precision::D, IndexWidth::W64) => plan_for::<f64, i64>(args),
        (Precision::C, IndexWidth::W64) => plan_for::<Complex32, i64>(args),
        (Precision::Z, IndexWidth::W64) => plan_for::<Complex64, i64>(args),
    }
}

fn plan_for<T: Scalar, I: LapackInt + TryFrom<i64>>(args: &PlanArgs) -> Result<WorkspacePlan> {
    let dim = |v: i64, name: &str| {
        I::try_from(v).map_err(|_| anyhow!("{name}={v} does not fit {}-bit indices", I::BITS))
    };
    let (n, nrhs, batch) = (dim(args.n, "n")?, dim(args.nrhs, "nrhs")?, dim(args.batch, "batch")?);

    let plan = match args.op {
        Op::Gesv => gesv_outofplace_plan::<T, I>(&GesvDims::new(n, nrhs, batch)),
        Op::Getrf => getrf_plan::<T, I>(&GetrfDims::square(n, batch)),
        Op::GetrfNpvt => getrf_npvt_plan::<T, I>(&GetrfDims::square(n, batch)),
        Op::Getrs => getrs_plan::<T, I>(args.trans.into(), &GetrsDims::new(n, nrhs, batch)),
        Op::Getri => getri_plan::<T, I>(&GetriDims::new(n, batch)),
        Op::GetriOutofplace => {
            getri_outofplace_plan::<T, I>(&GetriOutofplaceDims::new(n, batch))
        }
    }
    .with_context(|| format!("size query for {}", args.op.name()))?;
    Ok(plan)
}

/// Solve `problem` in its declared precision.
pub fn solve_problem(handle: &Handle, problem: &Problem) -> Result<SolveReport> {
    match problem.precision {
        Precision::S => solve_with(handle, problem, |re, _| re as f32, |v| (v as f64, 0.0)),
        Precision::D => solve_with(handle, problem, |re, _| re, |v| (v, 0.0)),
        Precision::C => solve_with(
            handle,
            problem,
            |re, im| Complex32::new(re as f32, im as f32),
            |z| (z.re as f64, z.im as f64),
        ),
        Precision::Z => solve_with(handle, problem, Complex64::new, |z| (z.re, z.im)),
    }
}

/// Run `solve_batch` on the problem lifted into `T`.
fn solve_with<T: Scalar>(
    handle: &Handle,
    problem: &Problem,
    lift: impl Fn(f64, f64) -> T,
    lower: impl Fn(T) -> (f64, f64),
) -> Result<SolveReport> {
    let complex = problem.precision.is_complex();
    if !complex && (problem.matrices_im.is_some() || problem.rhs_im.is_some()) {
        bail!("imaginary parts given for real precision '{}'", problem.precision.prefix());
    }

    let combine = |re: &[f64], im: Option<&Vec<f64>>, name: &str| -> Result<Vec<T>> {
        match im {
            Some(im) if im.len() != re.len() => Err(anyhow!(
                "{name}_im has {} entries, {name} has {}",
                im.len(),
                re.len()
            )),
            Some(im) => Ok(re.iter().zip(im).map(|(&r, &i)| lift(r, i)).collect()),
            None => Ok(re.iter().map(|&r| lift(r, 0.0)).collect()),
        }
    };
    let matrices = combine(&problem.matrices, problem.matrices_im.as_ref(), "matrices")?;
    let rhs = combine(&problem.rhs, problem.rhs_im.as_ref(), "rhs")?;

    let result = solve_batch(
        handle,
        &matrices,
        &rhs,
        problem.n,
        problem.nrhs,
        problem.batch_size,
    )
    .context("batched solve failed")?;

    let (solutions, imag): (Vec<f64>, Vec<f64>) =
        result.solutions.iter().map(|&v| lower(v)).unzip();
    Ok(SolveReport {
        precision: problem.precision.prefix(),
        n: result.n,
        nrhs: result.nrhs,
        batch_size: result.batch_size,
        info: result.info,
        singular: result.singular_indices,
        solutions,
        solutions_im: complex.then_some(imag),
    })
}
