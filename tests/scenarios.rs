use approx::assert_abs_diff_eq;
use ndarray::array;
use ndarray_minimize::direct::{HookeJeeves, HookeJeevesConfig, NelderMead};
use ndarray_minimize::line::{LineSearchConfig, LineSearchMethod};
use ndarray_minimize::linalg::invert;
use ndarray_minimize::smooth::{
    ConjugateGradient, ConjugateGradientConfig, Dfp, DfpConfig, LevenbergMarquardt,
    SteepestDescent, SteepestDescentConfig,
};
use ndarray_minimize::{Gradient, Matrix, Solution, Vector};

const A: f64 = 100.;
const B: f64 = 2.;
const F: f64 = 45.;

fn rosenbrock(x: &Vector) -> f64 {
    (0..2)
        .map(|i| A * (x[i].powi(2) - x[i + 1]).powi(2) + B * (x[i] - 1.).powi(2))
        .sum::<f64>()
        + F
}

fn rosenbrock_gradient() -> Gradient<'static> {
    Gradient::new()
        .partial(|x: &Vector| 4. * A * x[0] * (x[0].powi(2) - x[1]) + 2. * B * (x[0] - 1.))
        .partial(|x: &Vector| {
            -2. * A * (x[0].powi(2) - x[1])
                + 4. * A * x[1] * (x[1].powi(2) - x[2])
                + 2. * B * (x[1] - 1.)
        })
        .partial(|x: &Vector| -2. * A * (x[1].powi(2) - x[2]))
}

fn rosenbrock_hessian(x: &Vector) -> Matrix {
    let h00 = 4. * A * (3. * x[0].powi(2) - x[1]) + 2. * B;
    let h11 = 2. * A + 2. * B + 4. * A * (3. * x[1].powi(2) - x[2]);
    let h01 = -4. * A * x[0];
    let h12 = -4. * A * x[1];
    array![[h00, h01, 0.], [h01, h11, h12], [0., h12, 2. * A]].into()
}

#[test]
fn rosenbrock_all_optimizers_agree() {
    let x0 = Vector::zeros(3);
    let gradient = rosenbrock_gradient();
    let solutions: Vec<(&str, Solution)> = vec![
        ("Hooke-Jeeves", HookeJeeves::default().solve(rosenbrock, &x0).unwrap()),
        ("Nelder-Mead", NelderMead::default().solve(rosenbrock, &x0).unwrap()),
        (
            "steepest descent",
            SteepestDescent::default()
                .solve(rosenbrock, &gradient, &x0)
                .unwrap(),
        ),
        (
            "conjugate gradient",
            ConjugateGradient::default()
                .solve(rosenbrock, &gradient, &x0)
                .unwrap(),
        ),
        ("DFP", Dfp::default().solve(rosenbrock, &gradient, &x0).unwrap()),
        (
            "Levenberg-Marquardt",
            LevenbergMarquardt::default()
                .solve(rosenbrock, &gradient, rosenbrock_hessian, &x0)
                .unwrap(),
        ),
    ];

    for (name, solution) in solutions.iter() {
        assert!(solution.fx >= F - 1e-12, "{} went below the optimum", name);
        assert!(solution.fx - F < 1e-2, "{}: {}", name, solution.fx);
        assert_abs_diff_eq!(solution.x, Vector::filled(3, 1.), epsilon = 0.1);
    }
    for (_, first) in solutions.iter() {
        for (_, second) in solutions.iter() {
            assert_abs_diff_eq!(first.fx, second.fx, epsilon = 1e-2);
        }
    }
}

#[test]
fn rosenbrock_every_line_search() {
    let x0 = Vector::zeros(3);
    let gradient = rosenbrock_gradient();
    for &method in [
        LineSearchMethod::Bisection,
        LineSearchMethod::GoldenSection,
        LineSearchMethod::Fibonacci,
        LineSearchMethod::QuadraticInterpolation,
    ]
    .iter()
    {
        let line_search = LineSearchConfig::with_method(method);
        let solutions = vec![
            (
                "Hooke-Jeeves",
                HookeJeeves::new(HookeJeevesConfig {
                    line_search: line_search.clone(),
                    ..Default::default()
                })
                .solve(rosenbrock, &x0),
            ),
            (
                "steepest descent",
                SteepestDescent::new(SteepestDescentConfig {
                    line_search: line_search.clone(),
                    ..Default::default()
                })
                .solve(rosenbrock, &gradient, &x0),
            ),
            (
                "conjugate gradient",
                ConjugateGradient::new(ConjugateGradientConfig {
                    line_search: line_search.clone(),
                    ..Default::default()
                })
                .solve(rosenbrock, &gradient, &x0),
            ),
            (
                "DFP",
                Dfp::new(DfpConfig {
                    line_search: line_search.clone(),
                    ..Default::default()
                })
                .solve(rosenbrock, &gradient, &x0),
            ),
        ];
        for (name, solution) in solutions {
            let solution =
                solution.unwrap_or_else(|err| panic!("{} with {}: {}", name, method, err));
            assert!(solution.fx - F < 1e-2, "{} with {}: {}", name, method, solution.fx);
            assert_abs_diff_eq!(solution.x, Vector::filled(3, 1.), epsilon = 0.1);
        }
    }
}

#[test]
fn sextic_line_searches_agree() {
    let sextic = |x: f64| 100. * (x.powi(2) - 2.).powi(3) + (x - 1.).powi(2) - (10. + x).abs();
    let minima: Vec<f64> = [
        LineSearchMethod::Bisection,
        LineSearchMethod::GoldenSection,
        LineSearchMethod::Fibonacci,
    ]
    .iter()
    .map(|&method| {
        let config = LineSearchConfig {
            bracket_step: 0.005,
            ..LineSearchConfig::with_method(method)
        };
        config.minimize(sextic, -2.).unwrap().x
    })
    .collect();
    for x in minima.iter() {
        assert_abs_diff_eq!(*x, minima[0], epsilon = 1e-4);
        assert_abs_diff_eq!(*x, 0.001_248_96, epsilon = 1e-4);
    }
}

#[test]
fn inverse_of_two_by_two() {
    let a = Matrix::from_rows(vec![vec![1., 1.], vec![5., 2.]]).unwrap();
    let expected: Matrix = array![[-2. / 3., 1. / 3.], [5. / 3., -1. / 3.]].into();
    assert_abs_diff_eq!(a.inverse().unwrap(), expected, epsilon = 1e-4);
    assert_abs_diff_eq!(invert(&a).unwrap(), expected, epsilon = 1e-4);
    assert_abs_diff_eq!(
        a.multiply(&a.inverse().unwrap()).unwrap(),
        Matrix::identity(2),
        epsilon = 1e-9
    );
}

#[test]
fn parsed_line_search_drives_an_optimizer() {
    let method: LineSearchMethod = "golden ratio".parse().unwrap();
    assert_eq!(method, LineSearchMethod::GoldenSection);
    let config = DfpConfig {
        line_search: LineSearchConfig::with_method(method),
        ..Default::default()
    };
    let solution = Dfp::new(config)
        .solve(rosenbrock, &rosenbrock_gradient(), &Vector::zeros(3))
        .unwrap();
    assert_abs_diff_eq!(solution.fx, F, epsilon = 1e-2);
}
