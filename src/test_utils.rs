use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ndarray::Array1;
use ndarray::Array2;

use crate::code::BuildTools;

pub const BRIO_WU_ATHINPUT: &str = "<comment>
problem   = Brio & Wu shock tube
reference = Brio, M. & Wu, C.C., JCP 75, 400-422 (1988)
configure = -b --prob=shock_tube

<job>
problem_id = Brio-Wu   # problem ID: basename of output filenames

<output1>
file_type  = tab       # Tabular data dump
variable   = prim      # variables to be output
data_format = %12.5e    # Optional data format string
dt         = 0.01      # time increment between outputs

<time>
cfl_number = 0.8
tlim       = 0.1

<mesh>
nx1        = 800
x1min      = -0.5
x1max      = 0.5
ix1_bc     = outflow
ox1_bc     = outflow

<hydro>
gamma      = 2.0

<problem>
shock_dir  = 1
xshock     = 0.0
dl         = 1.0
pl         = 1.0
ul         = 0.0
vl         = 0.0
wl         = 0.0
bxl        = 0.75
byl        = 1.0
bzl        = 0.0
";

pub const BRIO_WU_INI: &str = "[run]
tend = 0.1
save_freq = 0.01

[mesh]
Nx = 8
Ny = 2

[physics]
riemann_solver = hlld
";

pub const ATHENA_TABULAR: &str = "# Athena++ data at time=0.100000  cycle=1053  variables=prim
#  i       x1v         rho         press        vel1         vel2         vel3         Bcc1         Bcc2         Bcc3
   0  -4.99375e-01  1.00000e+00  1.00000e+00  0.00000e+00  0.00000e+00  0.00000e+00  7.50000e-01  1.00000e+00  0.00000e+00
   1  -4.98125e-01  9.99000e-01  9.98000e-01  1.00000e-03  0.00000e+00  0.00000e+00  7.50000e-01  9.99000e-01  0.00000e+00
   2  -4.96875e-01  1.25000e-01  1.00000e-01  0.00000e+00  2.00000e-03  0.00000e+00  7.50000e-01 -1.00000e+00  0.00000e+00
";

#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut permissions = fs::metadata(path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).unwrap();
}

/// Stand-ins for cmake, make and python3 that append their command
/// line to a log file. Returns the tools and the path of the log.
#[cfg(unix)]
pub fn fake_build_tools(dir: &Path) -> (BuildTools, PathBuf) {
    let tools_dir = dir.join("tools");
    let log = dir.join("build.log");
    for name in ["cmake", "make", "python3"] {
        write_script(
            &tools_dir.join(name),
            &format!(
                "if [ $# -eq 0 ]; then echo {name} >> {log}; else echo \"{name} $*\" >> {log}; fi",
                log = log.display()
            ),
        );
    }
    let tools = BuildTools {
        cmake: tools_dir.join("cmake"),
        make: tools_dir.join("make"),
    };
    (tools, log)
}

/// A fake fv2d executable that writes its input path into `run.h5`,
/// creates `run.xdmf` and exits with the given code.
#[cfg(unix)]
pub fn fake_fv2d(base: &Path, exit_code: i32) {
    write_script(
        &base.join("build").join("fv2d"),
        &format!("echo \"$1\" > run.h5\ntouch run.xdmf\nexit {exit_code}"),
    );
}

/// A fake fv2d executable that fails before writing any output.
#[cfg(unix)]
pub fn crashing_fv2d(base: &Path) {
    write_script(
        &base.join("build").join("fv2d"),
        "echo crashed >&2\nexit 1",
    );
}

/// A fake Athena++ executable that writes two tabular outputs.
#[cfg(unix)]
pub fn fake_athena(base: &Path) {
    write_script(
        &base.join("bin").join("athena"),
        "[ \"$1\" = \"-i\" ] || exit 1\ntouch Brio-Wu.block0.out1.00000.tab Brio-Wu.block0.out1.00001.tab",
    );
}

/// Value of every fv2d test field at `(row, column)` of iteration `iteration`.
pub fn fv2d_test_value(iteration: usize, field_index: usize, row: usize, column: usize) -> f64 {
    (iteration * 1000 + field_index * 100 + row * 10 + column) as f64
}

pub const FV2D_FIELDS: [&str; 6] = ["rho", "prs", "u", "v", "w", "divB"];
pub const FV2D_MAGNETIC_FIELDS: [&str; 3] = ["bx", "by", "bz"];

/// Write an fv2d-style snapshot file with one `ite_NNNN` group per
/// given iteration, or with the fields at the root if `iterations`
/// is `None`.
pub fn write_fv2d_file(
    path: &Path,
    iterations: Option<&[usize]>,
    nx: usize,
    ny: usize,
    mhd: bool,
) {
    let file = hdf5::File::create(path).unwrap();
    let x = Array1::from_iter((0..nx * ny).map(|i| (i % nx) as f64 / nx as f64));
    let y = Array1::from_iter((0..nx * ny).map(|i| (i / nx) as f64 / ny as f64));
    file.new_dataset_builder().with_data(&x).create("x").unwrap();
    file.new_dataset_builder().with_data(&y).create("y").unwrap();
    let write_fields = |group: &hdf5::Group, iteration: usize| {
        let magnetic: &[&str] = if mhd { &FV2D_MAGNETIC_FIELDS } else { &[] };
        let names = FV2D_FIELDS.iter().chain(magnetic.iter());
        for (field_index, name) in names.enumerate() {
            let data = Array2::from_shape_fn((ny, nx), |(row, column)| {
                fv2d_test_value(iteration, field_index, row, column)
            });
            group
                .new_dataset_builder()
                .with_data(&data)
                .create(*name)
                .unwrap();
        }
    };
    match iterations {
        Some(iterations) => {
            for iteration in iterations {
                let group = file.create_group(&format!("ite_{iteration:04}")).unwrap();
                write_fields(&group, *iteration);
            }
        }
        None => write_fields(&*file, 0),
    }
}
