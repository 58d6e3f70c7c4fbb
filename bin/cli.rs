use odra::casper_types::U256;
use odra::host::HostEnv;
use odra::prelude::Addressable;

use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt, OdraCli,
};

use tier_launchpad::registry::{SaleRegistry, SaleRegistryInitArgs};
use tier_launchpad::staking::{StakingPool, StakingPoolInitArgs};
use tier_launchpad::tiers::{TierAggregator, TierAggregatorInitArgs};
use tier_launchpad::token::{MockToken, MockTokenInitArgs};

const DEPLOY_GAS: u64 = 200_000_000_000;

fn with_decimals(whole: u128) -> U256 {
    U256::from(whole) * U256::from(10u128.pow(18))
}

/// Deploys the full launchpad stack: a mock token for staking, the staking
/// pool, the tier aggregator wired to it, and the sale registry.
pub struct LaunchpadDeployScript;

impl DeployScript for LaunchpadDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        println!("Deploying launchpad stack...");

        let token = MockToken::load_or_deploy(
            env,
            MockTokenInitArgs {
                name: String::from("Launchpad Token"),
                symbol: String::from("LPT"),
                decimals: 18,
                initial_supply: with_decimals(1_000_000_000),
            },
            container,
            DEPLOY_GAS,
        )?;
        println!("MockToken at: {:?}", token.address());

        let staking = StakingPool::load_or_deploy(
            env,
            StakingPoolInitArgs {
                stake_token: *token.address(),
                reward_token: *token.address(),
                reward_rate_per_second: U256::zero(),
            },
            container,
            DEPLOY_GAS,
        )?;
        println!("StakingPool at: {:?}", staking.address());

        let mut tiers = TierAggregator::load_or_deploy(
            env,
            TierAggregatorInitArgs {
                t1: with_decimals(1_000),
                t2: with_decimals(5_000),
                t3: with_decimals(20_000),
            },
            container,
            DEPLOY_GAS,
        )?;
        tiers.add_staking_contract(*staking.address());
        println!("TierAggregator at: {:?}", tiers.address());

        let registry = SaleRegistry::load_or_deploy(
            env,
            SaleRegistryInitArgs {
                platform_fee_bps: 500,
                platform_treasury: env.get_account(0),
            },
            container,
            DEPLOY_GAS,
        )?;
        println!("SaleRegistry at: {:?}", registry.address());

        Ok(())
    }
}

/// Prints the platform configuration and the list of registered sales.
pub struct RegistryStatusScenario;

impl Scenario for RegistryStatusScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let registry = container.contract_ref::<SaleRegistry>(env)?;

        println!("Platform fee: {} bps", registry.platform_fee_bps());
        println!("Treasury: {:?}", registry.platform_treasury());
        let sales = registry.get_all_sales();
        println!("Sales: {}", sales.len());
        for sale_id in sales {
            let sale = registry.get_sale(sale_id);
            println!(
                "  #{sale_id}: raised {} base, sold {} tokens, finalized: {}",
                sale.total_raised_base, sale.total_tokens_sold, sale.finalized
            );
        }
        Ok(())
    }
}

impl ScenarioMetadata for RegistryStatusScenario {
    const NAME: &'static str = "registry-status";
    const DESCRIPTION: &'static str = "Prints the platform configuration and all sales";
}

pub fn main() {
    OdraCli::new()
        .about("CLI tool for the tier launchpad")
        .deploy(LaunchpadDeployScript)
        .contract::<SaleRegistry>()
        .contract::<StakingPool>()
        .contract::<TierAggregator>()
        .contract::<MockToken>()
        .scenario(RegistryStatusScenario)
        .build()
        .run();
}
