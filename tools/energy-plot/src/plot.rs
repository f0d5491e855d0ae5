//! Charts of an experiment: energy with migrations, live hosts and running VMs.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, TimeZone};
use log::debug;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use vmplaces_logs::config::DISPLAY_ORDER;
use vmplaces_logs::{Algorithm, ExperimentStats, ReportError, RunKey};

use crate::dashes::{dash_segments, DashStyle, DASH_CYCLE};
use crate::output::find_filename;

const FONT: &str = "sans-serif";
const FONT_SIZE: u32 = 14;

const ENERGY_CHART_SIZE: (u32, u32) = (525, 450);
const HOSTS_CHART_SIZE: (u32, u32) = (750, 450);
const VMS_CHART_SIZE: (u32, u32) = (960, 720);

const BAR_WIDTH: f64 = 0.18;
const POLICY_OFF_COLOR: RGBColor = RGBColor(0x88, 0x88, 0x88);
const POLICY_ON_COLOR: RGBColor = RGBColor(0xff, 0xff, 0xff);
const HOST_COLORS: [RGBColor; 4] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
];
const VM_COLORS: [RGBColor; 4] = [GREEN, BLUE, MAGENTA, YELLOW];

/// Host times are shown in Europe/Paris time, which is UTC+1 over the simulated epoch range.
const PARIS_UTC_OFFSET: i32 = 3600;

type DrawResult = Result<(), Box<dyn Error>>;

fn render_error(path: &Path) -> impl FnOnce(Box<dyn Error>) -> ReportError + '_ {
    move |e| ReportError::Render {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn saved(path: PathBuf) -> PathBuf {
    println!("Saved plot as {}", path.display());
    path
}

/// Formats seconds since the Unix epoch as `HH:MM` wall-clock time.
pub fn wall_clock(seconds: f64) -> String {
    FixedOffset::east_opt(PARIS_UTC_OFFSET)
        .and_then(|tz| tz.timestamp_opt(seconds as i64, 0).single())
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Turns a series of (time, value) changes into the corners of a step line,
/// each value holding until the next change.
pub fn step_points(series: &[(u64, i64)]) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(series.len() * 2);
    for (i, &(time, value)) in series.iter().enumerate() {
        if i > 0 {
            points.push((time as f64, series[i - 1].1 as f64));
        }
        points.push((time as f64, value as f64));
    }
    points
}

fn multiples(step: u64, end: u64) -> Vec<f64> {
    (0..=end / step).map(|i| (i * step) as f64).collect()
}

type PlotArea<'a> = DrawingArea<SVGBackend<'a>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Draws the x axis under `area` with a tick and a centred label at each of the `labels` positions.
fn draw_x_axis(root: &DrawingArea<SVGBackend<'_>, Shift>, area: &PlotArea<'_>, labels: &[(f64, String)]) -> DrawResult {
    let (x_pixels, y_pixels) = area.get_pixel_range();
    let baseline = y_pixels.end;
    root.draw(&PathElement::new(vec![(x_pixels.start, baseline), (x_pixels.end, baseline)], BLACK))?;
    let style = TextStyle::from((FONT, FONT_SIZE).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (x, label) in labels {
        let (px, _) = area.map_coordinate(&(*x, 0.));
        root.draw(&PathElement::new(vec![(px, baseline), (px, baseline + 5)], BLACK))?;
        root.draw(&Text::new(label.as_str(), (px, baseline + 8), style.clone()))?;
    }
    Ok(())
}

/// Energy bars and migration count of one algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyGroup {
    pub algorithm: Algorithm,
    pub policy_off: Option<f64>,
    pub policy_on: f64,
    pub migrations: Option<u64>,
}

/// Collects the energy bars of the runs with `hosts` compute hosts, in display order.
///
/// Algorithms without a host turn-off run in the energy table are left out.
pub fn energy_groups(stats: &ExperimentStats, hosts: u32) -> Vec<EnergyGroup> {
    DISPLAY_ORDER
        .iter()
        .filter_map(|&algorithm| {
            let on_key = RunKey::new(hosts, true, algorithm);
            let policy_on = stats.energy_of(on_key)?;
            Some(EnergyGroup {
                algorithm,
                policy_off: stats.energy_of(RunKey::new(hosts, false, algorithm)),
                policy_on,
                migrations: stats.runs.get(&on_key).map(|counters| counters.migrations),
            })
        })
        .collect()
}

fn draw_energy(path: &Path, groups: &[EnergyGroup]) -> DrawResult {
    let root = SVGBackend::new(path, ENERGY_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = groups.len() as f64;
    let max_energy = groups
        .iter()
        .flat_map(|g| [g.policy_off, Some(g.policy_on)])
        .flatten()
        .fold(0., f64::max);
    let max_migrations = groups.iter().filter_map(|g| g.migrations).max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .right_y_label_area_size(50)
        .build_cartesian_2d(-0.5..n - 0.5, 0f64..max_energy + 0.5)?
        .set_secondary_coord(-0.5..n - 0.5, 0f64..(max_migrations * 1.15).max(1.));

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .y_desc("Energy (Kilowatts)")
        .label_style((FONT, FONT_SIZE))
        .draw()?;
    let categories: Vec<(f64, String)> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (i as f64, g.algorithm.to_string()))
        .collect();
    draw_x_axis(&root, chart.plotting_area(), &categories)?;
    chart
        .configure_secondary_axes()
        .y_desc("Number of migrations")
        .label_style((FONT, FONT_SIZE))
        .draw()?;

    chart
        .draw_series(groups.iter().enumerate().filter_map(|(i, g)| {
            let x = i as f64;
            g.policy_off
                .map(|energy| Rectangle::new([(x - BAR_WIDTH, 0.), (x, energy)], POLICY_OFF_COLOR.filled()))
        }))?
        .label("Not turning off hosts")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 16, y + 5)], POLICY_OFF_COLOR.filled()));
    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x, 0.), (x + BAR_WIDTH, g.policy_on)], POLICY_ON_COLOR.filled())
        }))?
        .label("Turning off hosts")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 16, y + 5)], BLACK.stroke_width(1)));
    // outlines
    chart.draw_series(groups.iter().enumerate().flat_map(|(i, g)| {
        let x = i as f64;
        let off = g
            .policy_off
            .map(|energy| Rectangle::new([(x - BAR_WIDTH, 0.), (x, energy)], BLACK.stroke_width(1)));
        let on = Rectangle::new([(x, 0.), (x + BAR_WIDTH, g.policy_on)], BLACK.stroke_width(1));
        off.into_iter().chain(Some(on))
    }))?;

    let migrations: Vec<(f64, u64)> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| g.migrations.map(|m| (i as f64 + BAR_WIDTH / 2., m)))
        .collect();
    chart.draw_secondary_series(DashedLineSeries::new(
        migrations.iter().map(|&(x, m)| (x, m as f64)),
        6,
        3,
        BLACK.stroke_width(1),
    ))?;
    chart
        .draw_secondary_series(
            migrations
                .iter()
                .map(|&(x, m)| TriangleMarker::new((x, m as f64), 4, BLACK.filled())),
        )?
        .label("No. VM migrations")
        .legend(|(x, y)| TriangleMarker::new((x + 8, y), 4, BLACK.filled()));
    let annotation = TextStyle::from((FONT, FONT_SIZE - 3).into_font().style(FontStyle::Bold));
    chart.draw_secondary_series(
        migrations
            .iter()
            .map(|&(x, m)| EmptyElement::at((x, m as f64)) + Text::new(m.to_string(), (4, -16), annotation.clone())),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font((FONT, FONT_SIZE - 2))
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Draws one energy and migrations chart per host count of the energy table.
pub fn plot_energy(stats: &ExperimentStats, out_dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let load = stats.load_params();
    let mut saved_paths = Vec::new();
    for hosts in stats.energy_host_counts() {
        let groups = energy_groups(stats, hosts);
        debug!("ordered energy for {} hosts: {:?}", hosts, groups);
        if groups.is_empty() {
            debug!("no algorithm to plot for {} hosts", hosts);
            continue;
        }
        let path = find_filename(out_dir, &format!("energy_{}_{}_{}", hosts, load.mean, load.std), "svg");
        draw_energy(&path, &groups).map_err(render_error(&path))?;
        saved_paths.push(saved(path));
    }
    Ok(saved_paths)
}

struct HostLine<'a> {
    algorithm: Algorithm,
    points: &'a [(u64, i64)],
    dash: DashStyle,
    color: RGBColor,
}

fn draw_host_population(path: &Path, lines: &[HostLine]) -> DrawResult {
    let root = SVGBackend::new(path, HOSTS_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let all_points = || lines.iter().flat_map(|line| line.points.iter());
    let end = all_points().map(|&(time, _)| time).max().unwrap_or(0).max(1);
    let low = all_points().map(|&(_, count)| count).min().unwrap_or(0) - 1;
    let high = all_points().map(|&(_, count)| count).max().unwrap_or(0) + 1;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..end as f64, low as f64..high as f64)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .y_desc("Number of live hosts")
        .label_style((FONT, FONT_SIZE))
        .draw()?;
    // half-hour grid, labelled every hour
    chart.draw_series(
        multiples(1800, end)
            .into_iter()
            .map(|t| PathElement::new(vec![(t, low as f64), (t, high as f64)], BLACK.mix(0.1))),
    )?;
    let hours: Vec<(f64, String)> = multiples(3600, end).into_iter().map(|t| (t, wall_clock(t))).collect();
    draw_x_axis(&root, chart.plotting_area(), &hours)?;

    for line in lines {
        let style = line.color.stroke_width(2);
        let pixels: Vec<(f64, f64)> = step_points(line.points)
            .iter()
            .map(|point| {
                let (px, py) = chart.plotting_area().map_coordinate(point);
                (px as f64, py as f64)
            })
            .collect();
        for segment in dash_segments(&pixels, line.dash.pattern()) {
            let segment: Vec<(i32, i32)> = segment
                .iter()
                .map(|&(x, y)| (x.round() as i32, y.round() as i32))
                .collect();
            root.draw(&PathElement::new(segment, style))?;
        }
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
            .label(line.algorithm)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font((FONT, FONT_SIZE - 2))
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Draws one live host chart per host count, for the runs with host turn-off.
///
/// Lines take their dash style from a cycle shared by all the charts.
pub fn plot_host_population(stats: &ExperimentStats, out_dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let load = stats.load_params();
    let mut saved_paths = Vec::new();
    let mut next_dash = 0;
    for hosts in stats.population_host_counts() {
        let mut lines = Vec::new();
        for &algorithm in DISPLAY_ORDER {
            let points = match stats.host_population.get(&(hosts, algorithm)) {
                Some(points) => points,
                None => continue,
            };
            debug!("live hosts of {} with {} hosts: {:?}", algorithm, hosts, points);
            lines.push(HostLine {
                algorithm,
                points,
                dash: DASH_CYCLE[next_dash % DASH_CYCLE.len()],
                color: HOST_COLORS[lines.len() % HOST_COLORS.len()],
            });
            next_dash += 1;
        }
        if lines.is_empty() {
            continue;
        }
        let path = find_filename(out_dir, &format!("n_on_{}_{}_{}", hosts, load.mean, load.std), "svg");
        draw_host_population(&path, &lines).map_err(render_error(&path))?;
        saved_paths.push(saved(path));
    }
    Ok(saved_paths)
}

fn draw_vm_population(path: &Path, lines: &[(Algorithm, Vec<(f64, f64)>)], end: f64) -> DrawResult {
    let root = SVGBackend::new(path, VMS_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let max_vms = lines
        .iter()
        .flat_map(|(_, points)| points.iter().map(|&(_, count)| count))
        .fold(0., f64::max);
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..end, 0f64..max_vms * 1.05 + 1.)?;
    chart
        .configure_mesh()
        .x_desc("Simulation time (s)")
        .y_desc("Number of running VMs")
        .label_style((FONT, FONT_SIZE))
        .draw()?;

    for (i, (algorithm, points)) in lines.iter().enumerate() {
        let color = VM_COLORS[i % VM_COLORS.len()];
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.filled().stroke_width(1)).point_size(4))?
            .label(*algorithm)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font((FONT, FONT_SIZE - 2))
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Draws one running VM chart per host count of the event streams, for the runs with host turn-off.
pub fn plot_vm_population(stats: &ExperimentStats, out_dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let load = stats.load_params();
    let mut saved_paths = Vec::new();
    for hosts in stats.vm_host_counts() {
        let lines: Vec<(Algorithm, Vec<(f64, f64)>)> = DISPLAY_ORDER
            .iter()
            .filter_map(|&algorithm| {
                let series = stats.vm_population.get(&RunKey::new(hosts, true, algorithm))?;
                Some((algorithm, series.iter().map(|(time, count)| (time.0, *count as f64)).collect()))
            })
            .collect();
        if lines.is_empty() {
            continue;
        }
        let last_sample = lines
            .iter()
            .flat_map(|(_, points)| points.iter().map(|&(time, _)| time))
            .fold(0., f64::max);
        let end = stats.simulation_time.unwrap_or(last_sample).max(1.);
        let path = find_filename(out_dir, &format!("vms_on_{}_{}_{}", hosts, load.mean, load.std), "svg");
        draw_vm_population(&path, &lines, end).map_err(render_error(&path))?;
        saved_paths.push(saved(path));
    }
    Ok(saved_paths)
}
