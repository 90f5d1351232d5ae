//! Initial database migration.
//!
//! Creates all core tables, enums, triggers, and RLS policies. The database
//! enforces the organization boundary; role-level narrowing (tenant scopes)
//! is applied by the application policy engine from the same declarative
//! table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CORE TABLES
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: PROPERTY & CONTRACTS
        // ============================================================
        db.execute_unprepared(BUILDINGS_SQL).await?;
        db.execute_unprepared(CONTRACTS_SQL).await?;
        db.execute_unprepared(TENANT_CONTRACTS_SQL).await?;

        // ============================================================
        // PART 4: TICKETS, CONSUMPTION, DOCUMENTS
        // ============================================================
        db.execute_unprepared(TICKETS_SQL).await?;
        db.execute_unprepared(CONSUMPTION_RECORDS_SQL).await?;
        db.execute_unprepared(DOCUMENTS_SQL).await?;

        // ============================================================
        // PART 5: INVITATIONS
        // ============================================================
        db.execute_unprepared(INVITATION_TOKENS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 7: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User roles
CREATE TYPE user_role AS ENUM (
    'landlord_admin',
    'tenant'
);

-- Ticket status
CREATE TYPE ticket_status AS ENUM (
    'open',
    'in_progress',
    'waiting_for_tenant',
    'resolved',
    'closed'
);

-- Ticket priority
CREATE TYPE ticket_priority AS ENUM (
    'low',
    'medium',
    'high',
    'urgent'
);

-- Ticket category
CREATE TYPE ticket_category AS ENUM (
    'maintenance',
    'payment',
    'complaint',
    'general'
);

-- Consumption type
CREATE TYPE consumption_type AS ENUM (
    'electricity',
    'water',
    'gas',
    'heating',
    'other'
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL UNIQUE,
    contact_email VARCHAR(255),
    contact_phone VARCHAR(50),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_org ON users(organization_id);
CREATE INDEX idx_users_email ON users(email) WHERE is_active = true;
";

const BUILDINGS_SQL: &str = r"
CREATE TABLE buildings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    name VARCHAR(255) NOT NULL,
    street VARCHAR(255) NOT NULL,
    house_number VARCHAR(20) NOT NULL,
    postal_code VARCHAR(20) NOT NULL,
    city VARCHAR(100) NOT NULL,
    total_units INTEGER NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_buildings_org ON buildings(organization_id);
";

const CONTRACTS_SQL: &str = r"
CREATE TABLE contracts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    building_id UUID NOT NULL REFERENCES buildings(id),
    contract_number VARCHAR(100) NOT NULL,
    unit_number VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE,
    rent_amount NUMERIC(12, 2) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_contracts_org_number UNIQUE (organization_id, contract_number)
);

CREATE INDEX idx_contracts_org_building ON contracts(organization_id, building_id);
CREATE INDEX idx_contracts_unit ON contracts(building_id, unit_number) WHERE is_active = true;
";

const TENANT_CONTRACTS_SQL: &str = r"
CREATE TABLE tenant_contracts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    tenant_id UUID NOT NULL REFERENCES users(id),
    contract_id UUID NOT NULL REFERENCES contracts(id),
    percentage NUMERIC(5, 2) NOT NULL,
    is_main_tenant BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_tenant_contracts_link UNIQUE (tenant_id, contract_id),
    CONSTRAINT ck_tenant_contracts_percentage CHECK (percentage > 0 AND percentage <= 100)
);

CREATE INDEX idx_tenant_contracts_org ON tenant_contracts(organization_id);
CREATE INDEX idx_tenant_contracts_tenant ON tenant_contracts(tenant_id);
CREATE INDEX idx_tenant_contracts_contract ON tenant_contracts(contract_id);
";

const TICKETS_SQL: &str = r"
CREATE TABLE tickets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    building_id UUID NOT NULL REFERENCES buildings(id),
    contract_id UUID REFERENCES contracts(id),
    created_by_id UUID NOT NULL REFERENCES users(id),
    assigned_to_id UUID REFERENCES users(id),
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    status ticket_status NOT NULL DEFAULT 'open',
    priority ticket_priority NOT NULL DEFAULT 'medium',
    category ticket_category NOT NULL DEFAULT 'general',
    resolved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_tickets_org_status ON tickets(organization_id, status);
CREATE INDEX idx_tickets_building ON tickets(building_id);
CREATE INDEX idx_tickets_contract ON tickets(contract_id) WHERE contract_id IS NOT NULL;
CREATE INDEX idx_tickets_creator ON tickets(created_by_id);
";

const CONSUMPTION_RECORDS_SQL: &str = r"
CREATE TABLE consumption_records (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    contract_id UUID NOT NULL REFERENCES contracts(id),
    consumption_type consumption_type NOT NULL,
    period VARCHAR(7) NOT NULL,
    reading NUMERIC(12, 3) NOT NULL,
    cost NUMERIC(12, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- Natural key: duplicate detection and safe retry target
    CONSTRAINT uq_consumption_natural_key UNIQUE (contract_id, consumption_type, period)
);

CREATE INDEX idx_consumption_org_period ON consumption_records(organization_id, period);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    building_id UUID REFERENCES buildings(id),
    contract_id UUID REFERENCES contracts(id),
    ticket_id UUID REFERENCES tickets(id),
    uploaded_by_id UUID NOT NULL REFERENCES users(id),
    file_name VARCHAR(255) NOT NULL,
    title VARCHAR(255) NOT NULL,
    is_public BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_documents_org ON documents(organization_id);
CREATE INDEX idx_documents_contract ON documents(contract_id) WHERE contract_id IS NOT NULL;
CREATE INDEX idx_documents_ticket ON documents(ticket_id) WHERE ticket_id IS NOT NULL;
";

const INVITATION_TOKENS_SQL: &str = r"
CREATE TABLE invitation_tokens (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    contract_id UUID NOT NULL REFERENCES contracts(id),
    token_hash VARCHAR(64) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL,
    percentage NUMERIC(5, 2) NOT NULL DEFAULT 100,
    expires_at TIMESTAMPTZ NOT NULL,
    used_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invitation_tokens_org ON invitation_tokens(organization_id);
";

const TRIGGERS_SQL: &str = r"
-- Keep updated_at current on every UPDATE
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_organizations_updated_at BEFORE UPDATE ON organizations
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_buildings_updated_at BEFORE UPDATE ON buildings
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_contracts_updated_at BEFORE UPDATE ON contracts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_tenant_contracts_updated_at BEFORE UPDATE ON tenant_contracts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_tickets_updated_at BEFORE UPDATE ON tickets
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_consumption_records_updated_at BEFORE UPDATE ON consumption_records
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_documents_updated_at BEFORE UPDATE ON documents
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_invitation_tokens_updated_at BEFORE UPDATE ON invitation_tokens
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- Enable RLS on all tenant tables
-- ============================================================

ALTER TABLE organizations ENABLE ROW LEVEL SECURITY;
ALTER TABLE users ENABLE ROW LEVEL SECURITY;
ALTER TABLE buildings ENABLE ROW LEVEL SECURITY;
ALTER TABLE contracts ENABLE ROW LEVEL SECURITY;
ALTER TABLE tenant_contracts ENABLE ROW LEVEL SECURITY;
ALTER TABLE tickets ENABLE ROW LEVEL SECURITY;
ALTER TABLE consumption_records ENABLE ROW LEVEL SECURITY;
ALTER TABLE documents ENABLE ROW LEVEL SECURITY;
ALTER TABLE invitation_tokens ENABLE ROW LEVEL SECURITY;

-- Organization-boundary policies. The application sets the context inside
-- each transaction:
--   SET LOCAL app.current_organization_id = '<org-uuid>';
--   SET LOCAL app.current_user_id = '<user-uuid>';
--   SET LOCAL app.current_user_role = 'landlord_admin' | 'tenant';
-- Role-level narrowing (tenant scopes) is applied by the application
-- policy engine on top of these.

CREATE POLICY tenant_isolation ON organizations
    USING (id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON users
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON buildings
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON contracts
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON tenant_contracts
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON tickets
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON consumption_records
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

CREATE POLICY tenant_isolation ON documents
    USING (organization_id = current_setting('app.current_organization_id', true)::UUID);

-- Invitation tokens additionally shut out the tenant role at the storage
-- level: the application denies them anyway, this is defense-in-depth.
CREATE POLICY tenant_isolation ON invitation_tokens
    USING (
        organization_id = current_setting('app.current_organization_id', true)::UUID
        AND current_setting('app.current_user_role', true) = 'landlord_admin'
    );
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS invitation_tokens CASCADE;
DROP TABLE IF EXISTS documents CASCADE;
DROP TABLE IF EXISTS consumption_records CASCADE;
DROP TABLE IF EXISTS tickets CASCADE;
DROP TABLE IF EXISTS tenant_contracts CASCADE;
DROP TABLE IF EXISTS contracts CASCADE;
DROP TABLE IF EXISTS buildings CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;

DROP FUNCTION IF EXISTS set_updated_at() CASCADE;

DROP TYPE IF EXISTS consumption_type;
DROP TYPE IF EXISTS ticket_category;
DROP TYPE IF EXISTS ticket_priority;
DROP TYPE IF EXISTS ticket_status;
DROP TYPE IF EXISTS user_role;
";
